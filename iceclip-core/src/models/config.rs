use std::path::PathBuf;
use std::time::Duration;

/// Default stream sample rate assumed when sizing the buffer window.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Default number of bytes pulled from the stream per read.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Engine configuration.
///
/// The stream URL and window length are supplied per `connect` call; the rest
/// is fixed for the engine's lifetime except the clip destination, which can
/// be changed with `CaptureEngine::set_clip_destination`.
#[derive(Debug, Clone)]
pub struct CaptureConfiguration {
    /// Sample rate in Hz used to convert the window length into chunks (default: 48000).
    pub sample_rate: u32,

    /// Bytes per chunk read from the stream (default: 1024).
    pub chunk_size: usize,

    /// Connect and per-read timeout for the stream (default: 10 s).
    pub connect_timeout: Duration,

    /// Fixed delay before reopening the stream after a failure (default: 1 s).
    pub retry_delay: Duration,

    /// Directory where clips are written (default: `saved_clips`).
    pub output_directory: PathBuf,

    /// Clip file name prefix (default: `audio`).
    pub file_prefix: String,

    /// Clip file extension without the dot (default: `wav`). Clips hold the
    /// stream bytes as received, so the extension does not change the format.
    pub file_extension: String,

    /// Write a `{clip}.metadata.json` sidecar next to every clip (default: false).
    pub write_metadata: bool,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.chunk_size == 0 {
            return Err("chunk size must be positive".into());
        }
        if self.file_extension.is_empty() || self.file_extension.contains(['.', '/', '\\']) {
            return Err(format!("invalid clip extension: {:?}", self.file_extension));
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout: Duration::from_secs(10),
            retry_delay: Duration::from_secs(1),
            output_directory: PathBuf::from("saved_clips"),
            file_prefix: "audio".into(),
            file_extension: "wav".into(),
            write_metadata: false,
        }
    }
}

/// Validate the per-connect arguments.
pub fn validate_connect_args(url: &str, window_minutes: u32) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("please enter a valid URL".into());
    }
    if window_minutes == 0 {
        return Err("buffer size must be a positive number of minutes".into());
    }
    Ok(())
}
