use std::fs;
use std::path::{Path, PathBuf};

use crate::models::clip_result::ClipMetadata;
use crate::models::error::CaptureError;

/// Sidecar path for a clip: `audio_x.wav` → `audio_x.metadata.json`.
pub fn metadata_path(clip_path: &Path) -> PathBuf {
    clip_path.with_extension("metadata.json")
}

/// Write clip metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &ClipMetadata, clip_path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::Storage(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(clip_path), json)
        .map_err(|e| CaptureError::Storage(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read clip metadata from its JSON sidecar file.
pub fn read_metadata(clip_path: &Path) -> Result<ClipMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(clip_path))
        .map_err(|e| CaptureError::Storage(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| CaptureError::Storage(format!("failed to parse metadata: {}", e)))
}
