use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use iceclip_core::{CaptureDelegate, CaptureEngine, CaptureError, CaptureState, ClipResult};
use iceclip_http::HttpChunkSource;

use crate::settings::Settings;

pub type Engine = CaptureEngine<HttpChunkSource>;

/// Everything the control loop operates on.
pub struct AppState {
    pub engine: Engine,
    pub settings: Settings,
    pub settings_path: PathBuf,
    pending_saves: Vec<JoinHandle<Result<ClipResult, CaptureError>>>,
}

impl AppState {
    pub fn new(engine: Engine, settings: Settings, settings_path: PathBuf) -> Self {
        Self {
            engine,
            settings,
            settings_path,
            pending_saves: Vec::new(),
        }
    }

    /// Connect with the current settings.
    pub fn connect(&mut self) -> Result<(), CaptureError> {
        let url = self.settings.stream_url.clone();
        self.engine.connect(&url, self.settings.window_minutes)
    }

    /// Start a clip save; its outcome is reported through the delegate.
    pub fn save_clip(&mut self) -> Result<(), CaptureError> {
        self.pending_saves.retain(|handle| !handle.is_finished());
        let handle = self.engine.save_clip()?;
        self.pending_saves.push(handle);
        Ok(())
    }

    pub fn persist_settings(&self) -> Result<(), String> {
        self.settings
            .save(&self.settings_path)
            .map_err(|e| format!("failed to save settings to {}: {}", self.settings_path.display(), e))
    }

    /// Stop capturing and wait for in-flight saves and the ingestion thread.
    pub fn shutdown(&mut self) {
        self.engine.stop();
        for handle in self.pending_saves.drain(..) {
            if handle.join().is_err() {
                log::error!("clip writer thread panicked");
            }
        }
        if let Err(e) = self.engine.wait_for_shutdown() {
            log::error!("shutdown: {}", e);
        }
    }
}

/// CaptureDelegate that prints status lines to the terminal.
pub struct ConsoleDelegate {
    last_decile: Mutex<Option<u8>>,
}

impl ConsoleDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            last_decile: Mutex::new(None),
        })
    }
}

impl CaptureDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: &CaptureState) {
        log::info!("state: {}", state.label());
    }

    fn on_status(&self, message: &str) {
        println!("» {}", message);
    }

    fn on_progress(&self, fullness: f64) {
        // Report only in 10% steps; this fires once per chunk.
        let decile = (fullness / 10.0).floor() as u8;
        let mut last = self.last_decile.lock();
        if *last != Some(decile) {
            *last = Some(decile);
            if decile > 0 {
                println!("  buffer {:>3.0}% full", fullness);
            }
        }
    }

    fn on_error(&self, error: &CaptureError) {
        log::warn!("{}", error);
    }

    fn on_clip_saved(&self, result: &ClipResult) {
        println!(
            "  {} ({} bytes, sha256 {})",
            result.file_path.display(),
            result.payload_bytes,
            &result.checksum[..12.min(result.checksum.len())]
        );
    }
}
