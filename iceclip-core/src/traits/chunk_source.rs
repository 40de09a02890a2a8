use std::time::Duration;

use crate::models::audio_models::AudioChunk;
use crate::models::error::CaptureError;

/// Opens pull-based byte streams from a remote endpoint.
///
/// Implemented by:
/// - `HttpChunkSource` (iceclip-http)
///
/// Every failure is returned as an error, usually `CaptureError::Network`.
/// Implementations do not retry; the engine owns the retry policy.
pub trait ChunkSource: Send + Sync + 'static {
    type Stream: ChunkStream;

    /// Connect to `url`. `timeout` bounds the connect and each later read.
    /// Chunks yielded by the stream hold `chunk_size` bytes, except possibly
    /// the last one before end of stream.
    fn open(&self, url: &str, timeout: Duration, chunk_size: usize) -> Result<Self::Stream, CaptureError>;
}

/// An open stream, polled one chunk at a time from the ingestion thread.
pub trait ChunkStream: Send {
    /// Next chunk in arrival order, or `Ok(None)` at end of stream.
    fn next_chunk(&mut self) -> Result<Option<AudioChunk>, CaptureError>;
}
