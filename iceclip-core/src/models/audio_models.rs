use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Local};

/// One read's worth of stream bytes.
///
/// Opaque and immutable. Clones share the same allocation, so copying a
/// buffer snapshot never copies audio data.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioChunk(Arc<[u8]>);

impl AudioChunk {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for AudioChunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for AudioChunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl From<&[u8]> for AudioChunk {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }
}

impl fmt::Debug for AudioChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AudioChunk({} bytes)", self.0.len())
    }
}

/// One connect → stop lifetime of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSession {
    pub id: String,
    pub url: String,
    /// Window length requested at connect time. Later reconfiguration is
    /// reflected by `CaptureEngine::window_minutes`, not here.
    pub window_minutes: u32,
    pub sample_rate: u32,
    pub chunk_size: usize,
    pub started_at: DateTime<Local>,
}

impl CaptureSession {
    pub fn new(url: &str, window_minutes: u32, sample_rate: u32, chunk_size: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.to_string(),
            window_minutes,
            sample_rate,
            chunk_size,
            started_at: Local::now(),
        }
    }
}

/// Counters for debugging capture sessions. Reset on every connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureDiagnostics {
    pub chunks_received: u64,
    pub bytes_received: u64,
    pub connect_attempts: u64,
    pub capture_errors: u64,
    pub clips_saved: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_clones_share_bytes() {
        let chunk = AudioChunk::from(vec![1u8, 2, 3]);
        let copy = chunk.clone();
        assert_eq!(copy.as_bytes(), &[1, 2, 3]);
        assert_eq!(copy.len(), 3);
        assert!(std::ptr::eq(chunk.as_bytes(), copy.as_bytes()));
    }

    #[test]
    fn sessions_get_unique_ids() {
        let a = CaptureSession::new("http://example.com/a", 2, 48_000, 1024);
        let b = CaptureSession::new("http://example.com/a", 2, 48_000, 1024);
        assert_ne!(a.id, b.id);
    }
}
