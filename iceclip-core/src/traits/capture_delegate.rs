use crate::models::clip_result::ClipResult;
use crate::models::error::CaptureError;
use crate::models::state::CaptureState;

/// Receives engine events for a presentation layer.
///
/// Called from the ingestion and clip-writer threads as well as from the
/// thread driving the engine. Implementations should marshal to their UI
/// thread if needed. No engine lock is held during a callback.
pub trait CaptureDelegate: Send + Sync {
    fn on_state_changed(&self, state: &CaptureState);

    /// Human-readable status line (connecting, listening, errors, saves).
    fn on_status(&self, message: &str);

    /// Buffer fullness in `[0, 100]`, published after every push and clear.
    fn on_progress(&self, fullness: f64);

    /// A capture or save error. Always preceded by a matching `on_status`.
    fn on_error(&self, error: &CaptureError);

    fn on_clip_saved(&self, result: &ClipResult);
}
