//! HTTP(S) chunk source.
//!
//! Opens a streaming GET against an Icecast/Shoutcast-style endpoint and
//! hands out fixed-size chunks of the response body.

use std::io::{ErrorKind, Read};
use std::time::Duration;

use iceclip_core::models::audio_models::AudioChunk;
use iceclip_core::models::error::CaptureError;
use iceclip_core::traits::chunk_source::{ChunkSource, ChunkStream};

/// User agent sent with every stream request.
pub const USER_AGENT: &str = concat!("iceclip/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP backend.
///
/// Each `open` builds a fresh client so the timeout always matches the
/// engine's setting. In blocking mode the timeout applies to connecting and
/// to every individual body read, so a live stream can run indefinitely
/// while a stalled one fails within `timeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpChunkSource;

impl HttpChunkSource {
    pub fn new() -> Self {
        Self
    }
}

impl ChunkSource for HttpChunkSource {
    type Stream = HttpChunkStream;

    fn open(&self, url: &str, timeout: Duration, chunk_size: usize) -> Result<HttpChunkStream, CaptureError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| CaptureError::Network(format!("failed to build HTTP client: {}", e)))?;

        log::debug!("GET {}", url);
        let response = client
            .get(url)
            .send()
            .map_err(|e| CaptureError::Network(describe_request_error(url, &e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Network(format!("HTTP {} from {}", status, url)));
        }

        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            log::info!("stream {} opened ({})", url, content_type.to_str().unwrap_or("unknown type"));
        }

        Ok(HttpChunkStream::new(response, chunk_size))
    }
}

/// An open HTTP response body read in `chunk_size` pieces.
pub struct HttpChunkStream {
    body: Box<dyn Read + Send>,
    chunk_size: usize,
    finished: bool,
}

impl HttpChunkStream {
    /// Wrap any reader; used for the HTTP body and in tests.
    pub fn new(body: impl Read + Send + 'static, chunk_size: usize) -> Self {
        Self {
            body: Box::new(body),
            chunk_size: chunk_size.max(1),
            finished: false,
        }
    }
}

impl ChunkStream for HttpChunkStream {
    /// Fill one chunk. A short final chunk is returned as-is before
    /// end of stream is reported.
    fn next_chunk(&mut self) -> Result<Option<AudioChunk>, CaptureError> {
        if self.finished {
            return Ok(None);
        }

        let mut chunk = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            match self.body.read(&mut chunk[filled..]) {
                Ok(0) => {
                    self.finished = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(CaptureError::Network(format!("stream read failed: {}", e))),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        chunk.truncate(filled);
        Ok(Some(AudioChunk::from(chunk)))
    }
}

fn describe_request_error(url: &str, e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out connecting to {}", url)
    } else if e.is_connect() {
        format!("could not connect to {}: {}", url, e)
    } else {
        format!("request to {} failed: {}", url, e)
    }
}
