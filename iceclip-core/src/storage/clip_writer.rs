use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};

use crate::models::audio_models::AudioChunk;
use crate::models::clip_result::{ClipMetadata, ClipResult};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::storage::metadata;

/// Timestamp format used in clip file names, second resolution.
pub const CLIP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Writes buffer snapshots to disk as clip files.
///
/// ## File Format
///
/// ```text
/// [chunk 1][chunk 2]...[chunk n]
/// ```
///
/// No container header is added; the file is playable when the stream
/// itself is self-framing (MP3, ADTS AAC, Ogg).
///
/// Files are written to a hidden `.part` sibling and renamed into place, so a
/// failed save never leaves a truncated clip under the final name. Two saves
/// in the same second resolve to the same name; the later one wins.
#[derive(Debug, Clone)]
pub struct ClipWriter {
    extension: String,
    write_metadata: bool,
    source_url: Option<String>,
}

impl ClipWriter {
    pub fn new(config: &CaptureConfiguration) -> Self {
        Self {
            extension: config.file_extension.clone(),
            write_metadata: config.write_metadata,
            source_url: None,
        }
    }

    /// Record the stream URL in metadata sidecars.
    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = Some(url.to_string());
        self
    }

    /// Save `contents` as `{prefix}_{timestamp}.{ext}` inside `output_dir`,
    /// stamped with the current local time.
    pub fn save(&self, contents: &[AudioChunk], output_dir: &Path, prefix: &str) -> Result<ClipResult, CaptureError> {
        self.save_at(contents, output_dir, prefix, Local::now())
    }

    /// Same as `save` with an explicit timestamp.
    pub fn save_at(
        &self,
        contents: &[AudioChunk],
        output_dir: &Path,
        prefix: &str,
        created_at: DateTime<Local>,
    ) -> Result<ClipResult, CaptureError> {
        fs::create_dir_all(output_dir).map_err(|e| {
            CaptureError::Storage(format!("failed to create directory {}: {}", output_dir.display(), e))
        })?;

        let file_name = clip_file_name(prefix, &created_at, &self.extension);
        let file_path = output_dir.join(&file_name);

        let payload_len: usize = contents.iter().map(|c| c.len()).sum();
        let mut data = Vec::with_capacity(payload_len);
        for chunk in contents {
            data.extend_from_slice(chunk);
        }

        let part_path = output_dir.join(format!(".{}.{}.part", file_name, uuid::Uuid::new_v4().simple()));
        if let Err(e) = write_file(&part_path, &data) {
            fs::remove_file(&part_path).ok();
            return Err(e);
        }
        if let Err(e) = fs::rename(&part_path, &file_path) {
            fs::remove_file(&part_path).ok();
            return Err(CaptureError::Storage(format!(
                "failed to move clip into place at {}: {}",
                file_path.display(),
                e
            )));
        }

        let result = ClipResult {
            file_path,
            payload_bytes: payload_len as u64,
            chunk_count: contents.len(),
            created_at,
            checksum: hex_encode(&Sha256::digest(&data)),
        };

        // The clip is already in place; a missing sidecar does not fail the save.
        if self.write_metadata {
            let meta = ClipMetadata::from_result(&result, self.source_url.as_deref());
            if let Err(e) = metadata::write_metadata(&meta, &result.file_path) {
                log::warn!("clip {} saved without metadata: {}", result.file_path.display(), e);
            }
        }

        Ok(result)
    }
}

/// `{prefix}_{YYYY-MM-DD_HH-MM-SS}.{ext}` with the prefix made filesystem-safe.
pub fn clip_file_name(prefix: &str, created_at: &DateTime<Local>, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_prefix(prefix),
        created_at.format(CLIP_TIMESTAMP_FORMAT),
        extension
    )
}

/// Replace characters that are invalid in file names or would escape the
/// output directory.
fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .trim()
        .replace(|c: char| matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control(), "_")
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), CaptureError> {
    let mut file = File::create(path)
        .map_err(|e| CaptureError::Storage(format!("failed to create {}: {}", path.display(), e)))?;
    file.write_all(data)
        .map_err(|e| CaptureError::Storage(format!("write failed: {}", e)))?;
    file.sync_all()
        .map_err(|e| CaptureError::Storage(format!("sync failed: {}", e)))?;
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("iceclip_writer_test_{}_{}", name, std::process::id()));
        fs::remove_dir_all(&dir).ok();
        dir
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn chunks() -> Vec<AudioChunk> {
        vec![
            AudioChunk::from(vec![1u8, 2, 3]),
            AudioChunk::from(vec![4u8, 5]),
            AudioChunk::from(vec![6u8]),
        ]
    }

    #[test]
    fn file_name_format() {
        assert_eq!(clip_file_name("audio", &fixed_time(), "wav"), "audio_2024-03-09_14-05-07.wav");
        assert_eq!(clip_file_name("a/b:c", &fixed_time(), "mp3"), "a_b_c_2024-03-09_14-05-07.mp3");
    }

    #[test]
    fn raw_round_trip() {
        let dir = temp_dir("raw");
        let writer = ClipWriter::new(&CaptureConfiguration::default());

        let result = writer.save_at(&chunks(), &dir, "audio", fixed_time()).unwrap();

        assert_eq!(result.file_path, dir.join("audio_2024-03-09_14-05-07.wav"));
        assert_eq!(result.payload_bytes, 6);
        assert_eq!(result.chunk_count, 3);
        assert_eq!(result.checksum.len(), 64);
        assert_eq!(fs::read(&result.file_path).unwrap(), vec![1, 2, 3, 4, 5, 6]);

        // Only the clip remains, no .part leftovers.
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_snapshot_writes_empty_file() {
        let dir = temp_dir("empty");
        let writer = ClipWriter::new(&CaptureConfiguration::default());

        let result = writer.save_at(&[], &dir, "audio", fixed_time()).unwrap();

        assert_eq!(result.payload_bytes, 0);
        assert_eq!(fs::read(&result.file_path).unwrap().len(), 0);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn creates_nested_output_directory() {
        let dir = temp_dir("nested");
        let nested = dir.join("a").join("b");
        let writer = ClipWriter::new(&CaptureConfiguration::default());

        let result = writer.save_at(&chunks(), &nested, "audio", fixed_time()).unwrap();
        assert!(result.file_path.starts_with(&nested));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn same_second_overwrites() {
        let dir = temp_dir("overwrite");
        let writer = ClipWriter::new(&CaptureConfiguration::default());

        writer.save_at(&chunks(), &dir, "audio", fixed_time()).unwrap();
        let second = writer
            .save_at(&[AudioChunk::from(vec![9u8])], &dir, "audio", fixed_time())
            .unwrap();

        assert_eq!(fs::read(&second.file_path).unwrap(), vec![9]);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn output_dir_blocked_by_file_is_storage_error() {
        let dir = temp_dir("blocked");
        fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let writer = ClipWriter::new(&CaptureConfiguration::default());

        let err = writer.save_at(&chunks(), &blocker.join("clips"), "audio", fixed_time()).unwrap_err();
        assert!(matches!(err, CaptureError::Storage(_)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn metadata_sidecar() {
        let dir = temp_dir("sidecar");
        let config = CaptureConfiguration {
            write_metadata: true,
            ..Default::default()
        };
        let writer = ClipWriter::new(&config).with_source_url("http://example.com/live");

        let result = writer.save_at(&chunks(), &dir, "audio", fixed_time()).unwrap();
        let meta = metadata::read_metadata(&result.file_path).unwrap();

        assert_eq!(meta.source_url.as_deref(), Some("http://example.com/live"));
        assert_eq!(meta.payload_bytes, 6);
        assert_eq!(meta.checksum, result.checksum);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sidecar_failure_keeps_saved_clip() {
        let dir = temp_dir("sidecar_blocked");
        // A directory where the sidecar file should go makes its write fail.
        fs::create_dir_all(metadata::metadata_path(&dir.join("audio_2024-03-09_14-05-07.wav"))).unwrap();
        let config = CaptureConfiguration {
            write_metadata: true,
            ..Default::default()
        };
        let writer = ClipWriter::new(&config);

        let result = writer.save_at(&chunks(), &dir, "audio", fixed_time()).unwrap();

        assert_eq!(fs::read(&result.file_path).unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(result.payload_bytes, 6);
        fs::remove_dir_all(&dir).ok();
    }
}
