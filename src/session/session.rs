use serde::Serialize;
use std::ops::ControlFlow;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::config::SessionConfig;
use super::state::SessionState;
use super::stats::SessionStats;
use crate::error::{SessionError, TransportError};
use crate::protocol::{ClientMessage, ClientResponse, ControlHandler, ResultsPush};
use crate::provider::ProviderAdapter;
use crate::transcript::ResultRecord;
use crate::transport::{Frame, Transport};

type Received = Option<Result<Frame, TransportError>>;

enum Event {
    Client(Received),
    Provider(Received),
}

/// One client connection paired with its own provider connection
///
/// The session runs as a single task: the client and provider sockets are
/// polled together, each frame is handled to completion before the next one
/// is read, and frames from one socket are handled in arrival order.
pub struct Session<C, P> {
    /// Selections, audio relay, transcript and result queue of this session
    state: SessionState,

    /// Answers client control requests against `state`
    handler: ControlHandler,

    /// Provider handshake and message decoding, bound to this session's uid
    adapter: ProviderAdapter,

    /// Whether finalized results are pushed as they are produced
    push_results: bool,

    /// Client connection; its end is the end of the session
    client: C,

    /// `None` once the provider connection is gone (or never came up)
    provider: Option<P>,

    /// Whether dropping client audio was already reported
    warned_no_provider: bool,
}

impl<C, P> Session<C, P>
where
    C: Transport,
    P: Transport,
{
    /// Create a session over a client connection and a fresh provider connection
    ///
    /// Pass `None` for `provider` when it could not be reached; control
    /// requests keep working and client audio is counted and dropped.
    pub fn open(client: C, provider: Option<P>, config: &SessionConfig) -> Self {
        Self {
            state: SessionState::new(config),
            handler: ControlHandler::new(config.catalogs.clone()),
            adapter: ProviderAdapter::new(&config.provider),
            push_results: config.push_results,
            client,
            provider,
            warned_no_provider: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    /// Drive the session until the client goes away
    pub async fn run(self) -> SessionStats {
        let span = info_span!("session", id = %self.state.id);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(mut self) -> SessionStats {
        info!(
            "Session opened (uid={}, codec={}, language={})",
            self.adapter.uid(),
            self.state.selected_codec,
            self.state.selected_language
        );

        self.send_handshake().await;

        // Wait on both sockets while the provider is up, on the client alone after
        loop {
            let event = match self.provider.as_mut() {
                Some(provider) => tokio::select! {
                    frame = self.client.recv() => Event::Client(frame),
                    frame = provider.recv() => Event::Provider(frame),
                },
                None => Event::Client(self.client.recv().await),
            };

            let flow = match event {
                Event::Client(frame) => self.on_client(frame).await,
                Event::Provider(frame) => self.on_provider(frame).await,
            };

            match flow {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(e) => {
                    warn!("{}", e);
                    break;
                }
            }
        }

        self.teardown().await
    }

    async fn send_handshake(&mut self) {
        let Some(provider) = self.provider.as_mut() else {
            warn!("No provider connection, client audio will be dropped");
            return;
        };

        let frame = match self.adapter.handshake_frame(&self.state.selected_language) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode provider handshake: {}", e);
                return;
            }
        };

        let sent = provider.send(frame).await;
        if let Err(e) = sent {
            self.provider_failed(SessionError::Provider(e)).await;
        }
    }

    // ========================================================================
    // Client side
    // ========================================================================

    async fn on_client(&mut self, frame: Received) -> Result<ControlFlow<()>, SessionError> {
        match frame {
            None | Some(Ok(Frame::Close)) => {
                info!("Client disconnected");
                Ok(ControlFlow::Break(()))
            }
            Some(Err(e)) => Err(SessionError::Client(e)),
            Some(Ok(Frame::Binary(data))) => {
                self.relay_audio(&data).await;
                Ok(ControlFlow::Continue(()))
            }
            Some(Ok(Frame::Text(text))) => {
                if let Some(reply) = self.on_client_text(&text) {
                    self.send_client(reply).await?;
                }
                Ok(ControlFlow::Continue(()))
            }
        }
    }

    async fn relay_audio(&mut self, data: &[u8]) {
        // No reconnect is attempted, so audio without a provider is counted and dropped
        let Some(provider) = self.provider.as_mut() else {
            self.state.relay.discard(data);
            if !self.warned_no_provider {
                warn!("Provider is not connected, dropping client audio");
                self.warned_no_provider = true;
            }
            return;
        };

        let forwarded = self.state.relay.forward(data, provider).await;
        if let Err(e) = forwarded {
            self.provider_failed(SessionError::Provider(e)).await;
        }
    }

    fn on_client_text(&mut self, text: &str) -> Option<Frame> {
        match ClientMessage::parse(text) {
            Ok(ClientMessage::Request(raw)) => {
                debug!("Request received: {}", text);
                self.state.stats.requests_handled += 1;
                let response = self.handler.handle(&mut self.state, &raw);
                encode(&response)
            }
            Ok(ClientMessage::Response(response)) => {
                Self::on_client_response(&response);
                None
            }
            Err(e) => {
                warn!("Dropping malformed client message: {}", e);
                None
            }
        }
    }

    fn on_client_response(response: &ClientResponse) {
        match &response.error_msg {
            Some(msg) => warn!(
                "Client rejected '{}' (id={}): {}",
                response.response, response.id, msg
            ),
            None => debug!(
                "Client acknowledged '{}' (id={})",
                response.response, response.id
            ),
        }
    }

    async fn send_client(&mut self, frame: Frame) -> Result<(), SessionError> {
        self.client.send(frame).await.map_err(SessionError::Client)
    }

    // ========================================================================
    // Provider side
    // ========================================================================

    async fn on_provider(&mut self, frame: Received) -> Result<ControlFlow<()>, SessionError> {
        match frame {
            None | Some(Ok(Frame::Close)) => {
                info!("Provider connection closed");
                self.release_provider().await;
            }
            Some(Err(e)) => self.provider_failed(SessionError::Provider(e)).await,
            Some(Ok(Frame::Binary(data))) => {
                debug!("Ignoring {} byte binary frame from provider", data.len());
            }
            Some(Ok(Frame::Text(text))) => {
                let decoded = self.adapter.decode(&text);
                match decoded {
                    Ok(events) => {
                        for event in events {
                            if let Some(record) = self.state.reconciler.apply(event) {
                                self.emit(record).await?;
                            }
                        }
                    }
                    Err(e) => warn!("Ignoring malformed provider message: {}", e),
                }
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Deliver a finalized result exactly once
    ///
    /// The result is pushed when pushing is enabled. It is queued for
    /// `get results` only when it could not be pushed.
    async fn emit(&mut self, record: ResultRecord) -> Result<(), SessionError> {
        self.state.stats.results_emitted += 1;

        if !self.push_results {
            self.state.queue_result(record);
            return Ok(());
        }

        let push = ResultsPush::new(vec![record]);
        debug!("Pushing result (id={})", push.id);

        let Some(frame) = encode(&push) else {
            self.requeue(push);
            return Ok(());
        };

        let sent = self.send_client(frame).await;
        if sent.is_err() {
            self.requeue(push);
        }
        sent
    }

    fn requeue(&mut self, push: ResultsPush) {
        for record in push.params.results.into_iter().flatten() {
            self.state.queue_result(record);
        }
    }

    async fn provider_failed(&mut self, e: SessionError) {
        error!("{}", e);
        self.release_provider().await;
    }

    /// Close the provider connection and drop audio meant for it
    ///
    /// Later calls are no-ops.
    async fn release_provider(&mut self) {
        if let Some(mut provider) = self.provider.take() {
            if let Err(e) = provider.close().await {
                debug!("Provider close: {}", e);
            }

            let dropped = self.state.relay.clear();
            if dropped > 0 {
                warn!("{} byte(s) of audio were not forwarded", dropped);
            }
        }
    }

    async fn teardown(mut self) -> SessionStats {
        info!("Closing provider connection");
        self.release_provider().await;

        if let Err(e) = self.client.close().await {
            debug!("Client close: {}", e);
        }

        let stats = self.state.snapshot();
        debug!(
            "Reconciler ended in {:?} phase, last appended {:?}",
            self.state.reconciler.phase(),
            self.state.reconciler.last_appended_text()
        );
        info!(
            "Session closed after {:.1}s: {} bytes in, {} chunks out, {} bytes dropped, {} results, {} requests",
            stats.duration_secs,
            stats.bytes_received,
            stats.chunks_forwarded,
            stats.bytes_dropped,
            stats.results_emitted,
            stats.requests_handled
        );
        stats
    }
}

fn encode<T: Serialize>(message: &T) -> Option<Frame> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Frame::Text(text)),
        Err(e) => {
            error!("Failed to encode message: {}", e);
            None
        }
    }
}
