//! # iceclip-http
//!
//! HTTP(S) streaming backend for iceclip.
//!
//! Provides:
//! - `HttpChunkSource`: `ChunkSource` over a blocking `reqwest` client
//! - `HttpChunkStream`: fixed-size chunking of a response body
//!
//! ## Usage
//! ```ignore
//! use iceclip_core::{CaptureConfiguration, CaptureEngine};
//! use iceclip_http::HttpChunkSource;
//!
//! let mut engine = CaptureEngine::new(HttpChunkSource::new(), CaptureConfiguration::default())?;
//! engine.connect("https://audio.ury.org.uk/live-high", 2)?;
//! ```

pub mod http_source;

pub use http_source::{HttpChunkSource, HttpChunkStream, USER_AGENT};
