// Shared test doubles: in-memory sockets implementing `Transport`

#![allow(dead_code)]

use anyhow::{Context, Result};
use speech_bridge::{Catalogs, Frame, SessionConfig, Transport, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Session-side end of a fake connection
pub struct FakeSocket {
    inbound: mpsc::UnboundedReceiver<Frame>,
    outbound: mpsc::UnboundedSender<Frame>,
    closes: Arc<AtomicUsize>,
}

/// Test-side end of a fake connection
pub struct FakePeer {
    /// Frames the session will receive
    pub tx: mpsc::UnboundedSender<Frame>,
    /// Frames the session sent
    pub rx: mpsc::UnboundedReceiver<Frame>,
    closes: Arc<AtomicUsize>,
}

pub fn fake_socket() -> (FakeSocket, FakePeer) {
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let closes = Arc::new(AtomicUsize::new(0));

    (
        FakeSocket {
            inbound: in_rx,
            outbound: out_tx,
            closes: Arc::clone(&closes),
        },
        FakePeer {
            tx: in_tx,
            rx: out_rx,
            closes,
        },
    )
}

#[async_trait::async_trait]
impl Transport for FakeSocket {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.outbound.send(frame).map_err(|_| TransportError::NotOpen)
    }

    async fn recv(&mut self) -> Option<Result<Frame, TransportError>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl FakePeer {
    pub fn send_text(&self, value: serde_json::Value) -> Result<()> {
        self.tx
            .send(Frame::Text(value.to_string()))
            .context("session stopped receiving")
    }

    pub fn send_raw(&self, text: &str) -> Result<()> {
        self.tx
            .send(Frame::Text(text.to_string()))
            .context("session stopped receiving")
    }

    pub fn send_binary(&self, data: Vec<u8>) -> Result<()> {
        self.tx
            .send(Frame::Binary(data))
            .context("session stopped receiving")
    }

    /// Next frame the session sent, failing after a timeout
    pub async fn next_frame(&mut self) -> Result<Frame> {
        tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
            .await
            .context("timed out waiting for a frame")?
            .context("session closed the channel")
    }

    /// Next text frame, parsed as JSON
    pub async fn next_json(&mut self) -> Result<serde_json::Value> {
        match self.next_frame().await? {
            Frame::Text(text) => Ok(serde_json::from_str(&text)?),
            other => anyhow::bail!("expected a text frame, got {:?}", other),
        }
    }

    /// Every frame sent so far, without waiting
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub fn session_config() -> SessionConfig {
    let catalogs = Catalogs::new(
        vec!["ulaw".to_string(), "slin16".to_string()],
        vec!["en-US".to_string(), "de-DE".to_string()],
    )
    .expect("valid catalogs");

    SessionConfig::new(Arc::new(catalogs))
}
