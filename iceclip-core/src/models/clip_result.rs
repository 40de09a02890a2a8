use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Returned when a clip has been written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipResult {
    pub file_path: PathBuf,
    /// Stream bytes in the clip.
    pub payload_bytes: u64,
    pub chunk_count: usize,
    pub created_at: DateTime<Local>,
    /// SHA-256 hex digest of the complete file as written.
    pub checksum: String,
}

/// JSON sidecar describing a saved clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub id: String,
    pub file_path: String,
    pub source_url: Option<String>,
    pub payload_bytes: u64,
    pub chunk_count: usize,
    pub checksum: String,
    pub created_at: String,
}

impl ClipMetadata {
    pub fn from_result(result: &ClipResult, source_url: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: result.file_path.to_string_lossy().into_owned(),
            source_url: source_url.map(str::to_string),
            payload_bytes: result.payload_bytes,
            chunk_count: result.chunk_count,
            checksum: result.checksum.clone(),
            created_at: result.created_at.to_rfc3339(),
        }
    }
}
