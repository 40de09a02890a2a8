//! # iceclip-core
//!
//! Network-agnostic instant-replay core.
//!
//! Keeps the most recent minutes of a live byte stream in a time-windowed
//! buffer and cuts clips from it on demand without pausing ingestion.
//! Stream backends (HTTP in `iceclip-http`) implement the `ChunkSource`
//! trait and plug into the generic `CaptureEngine`.
//!
//! ## Architecture
//!
//! ```text
//! iceclip-core (this crate)
//! ├── traits/       ← ChunkSource, ChunkStream, CaptureDelegate
//! ├── models/       ← CaptureError, CaptureState, CaptureConfiguration, AudioChunk, ClipResult
//! ├── processing/   ← RingBuffer, ProgressReporter
//! ├── session/      ← CaptureEngine, CancellationToken
//! └── storage/      ← ClipWriter, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioChunk, CaptureDiagnostics, CaptureSession};
pub use models::clip_result::{ClipMetadata, ClipResult};
pub use models::config::{CaptureConfiguration, DEFAULT_CHUNK_SIZE, DEFAULT_SAMPLE_RATE};
pub use models::error::CaptureError;
pub use models::state::CaptureState;
pub use processing::progress::ProgressReporter;
pub use processing::ring_buffer::RingBuffer;
pub use session::cancel::CancellationToken;
pub use session::engine::CaptureEngine;
pub use storage::clip_writer::ClipWriter;
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::chunk_source::{ChunkSource, ChunkStream};
