// Audio relay buffer
//
// Client audio arrives in frames of arbitrary size. The provider only ever
// receives fixed-size chunks: bytes accumulate here until a full chunk is
// available, and the remainder waits for the next client frame.

use tracing::debug;

use crate::error::TransportError;
use crate::transport::{Frame, Transport};

/// Size of every audio chunk forwarded to the provider
pub const CHUNK_SIZE: usize = 8192;

/// Per-session byte accumulator that forwards whole chunks only
#[derive(Debug, Default)]
pub struct AudioRelay {
    /// Bytes waiting for a full chunk
    buffer: Vec<u8>,
    /// Total audio bytes received from the client
    bytes_received: u64,
    /// Chunks the provider accepted
    chunks_forwarded: u64,
    /// Bytes received or still buffered after the provider went away
    bytes_dropped: u64,
}

impl AudioRelay {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(CHUNK_SIZE * 2),
            ..Default::default()
        }
    }

    /// Append client audio to the accumulator
    pub fn ingest(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        self.bytes_received += data.len() as u64;
    }

    /// Forward every complete chunk to the provider, in order
    ///
    /// A chunk is removed from the accumulator only after the provider accepted
    /// it, so a failed send leaves every unsent byte in place.
    pub async fn flush<T>(&mut self, provider: &mut T) -> Result<usize, TransportError>
    where
        T: Transport + ?Sized,
    {
        let mut sent = 0;

        while self.buffer.len() >= CHUNK_SIZE {
            let chunk = self.buffer[..CHUNK_SIZE].to_vec();
            provider.send(Frame::Binary(chunk)).await?;

            self.buffer.drain(..CHUNK_SIZE);
            self.chunks_forwarded += 1;
            sent += 1;
        }

        if sent > 0 {
            debug!(
                "Forwarded {} chunk(s), {} byte(s) buffered",
                sent,
                self.buffer.len()
            );
        }

        Ok(sent)
    }

    /// Ingest and flush in one step
    pub async fn forward<T>(&mut self, data: &[u8], provider: &mut T) -> Result<usize, TransportError>
    where
        T: Transport + ?Sized,
    {
        self.ingest(data);
        self.flush(provider).await
    }

    /// Count client audio that has nowhere to go, without holding on to it
    pub fn discard(&mut self, data: &[u8]) {
        self.bytes_received += data.len() as u64;
        self.bytes_dropped += data.len() as u64;
    }

    /// Drop whatever is still buffered; returns the number of bytes dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer = Vec::new();
        self.bytes_dropped += dropped as u64;
        dropped
    }

    /// Bytes waiting for a full chunk (or for the provider to accept them)
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn chunks_forwarded(&self) -> u64 {
        self.chunks_forwarded
    }

    pub fn bytes_dropped(&self) -> u64 {
        self.bytes_dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records binary frames; refuses them once `fail_after` frames were taken
    #[derive(Default)]
    struct RecordingProvider {
        frames: Vec<Vec<u8>>,
        fail_after: Option<usize>,
    }

    #[async_trait::async_trait]
    impl Transport for RecordingProvider {
        async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
            if self.fail_after.is_some_and(|limit| self.frames.len() >= limit) {
                return Err(TransportError::NotOpen);
            }
            if let Frame::Binary(data) = frame {
                self.frames.push(data);
            }
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<Frame, TransportError>> {
            None
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_partial_chunk_is_held_back() {
        let mut relay = AudioRelay::new();
        let mut provider = RecordingProvider::default();

        let sent = relay.forward(&[1u8; 8000], &mut provider).await.unwrap();

        assert_eq!(sent, 0);
        assert!(provider.frames.is_empty());
        assert_eq!(relay.buffered(), 8000);
    }

    #[tokio::test]
    async fn test_chunk_released_when_threshold_crossed() {
        let mut relay = AudioRelay::new();
        let mut provider = RecordingProvider::default();

        relay.forward(&[1u8; 8000], &mut provider).await.unwrap();
        let sent = relay.forward(&[2u8; 500], &mut provider).await.unwrap();

        assert_eq!(sent, 1);
        assert_eq!(provider.frames[0].len(), CHUNK_SIZE);
        assert!(provider.frames[0][..8000].iter().all(|&b| b == 1));
        assert!(provider.frames[0][8000..].iter().all(|&b| b == 2));
        assert_eq!(relay.buffered(), 8500 - CHUNK_SIZE);
    }

    #[tokio::test]
    async fn test_large_frame_splits_into_several_chunks() {
        let mut relay = AudioRelay::new();
        let mut provider = RecordingProvider::default();

        let sent = relay
            .forward(&vec![7u8; CHUNK_SIZE * 3 + 10], &mut provider)
            .await
            .unwrap();

        assert_eq!(sent, 3);
        assert!(provider.frames.iter().all(|f| f.len() == CHUNK_SIZE));
        assert_eq!(relay.buffered(), 10);
        assert_eq!(relay.chunks_forwarded(), 3);
        assert_eq!(relay.bytes_received(), (CHUNK_SIZE * 3 + 10) as u64);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_bytes() {
        let mut relay = AudioRelay::new();
        let mut provider = RecordingProvider {
            fail_after: Some(1),
            ..Default::default()
        };

        let mut data = vec![1u8; CHUNK_SIZE];
        data.extend(vec![2u8; CHUNK_SIZE + 1]);
        let result = relay.forward(&data, &mut provider).await;

        assert!(result.is_err());
        assert_eq!(provider.frames, vec![vec![1u8; CHUNK_SIZE]]);
        assert_eq!(relay.buffered(), CHUNK_SIZE + 1);

        // Provider recovers: the held bytes go out first, in order
        provider.fail_after = None;
        relay.flush(&mut provider).await.unwrap();
        assert_eq!(provider.frames[1], vec![2u8; CHUNK_SIZE]);
        assert_eq!(relay.buffered(), 1);
    }

    #[test]
    fn test_discard_and_clear_hold_no_audio() {
        let mut relay = AudioRelay::new();

        relay.ingest(&[0u8; 100]);
        assert_eq!(relay.clear(), 100);

        relay.discard(&[0u8; CHUNK_SIZE * 4]);

        assert_eq!(relay.buffered(), 0);
        assert_eq!(relay.bytes_received(), (100 + CHUNK_SIZE * 4) as u64);
        assert_eq!(relay.bytes_dropped(), (100 + CHUNK_SIZE * 4) as u64);
        assert_eq!(relay.chunks_forwarded(), 0);
    }
}
