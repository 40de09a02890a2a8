use std::sync::Arc;

use parking_lot::Mutex;

use super::ring_buffer::RingBuffer;

/// Buffer fullness as a percentage in `[0, 100]`.
///
/// A zero capacity is treated as one so a misconfigured window never divides
/// by zero.
pub fn fullness(len: usize, capacity: usize) -> f64 {
    let capacity = capacity.max(1);
    (100.0 * len as f64 / capacity as f64).min(100.0)
}

/// Read-only view of the engine's buffer for progress displays.
///
/// Cheap to clone and safe to poll from any thread.
#[derive(Clone)]
pub struct ProgressReporter {
    buffer: Arc<Mutex<RingBuffer>>,
}

impl ProgressReporter {
    pub fn new(buffer: Arc<Mutex<RingBuffer>>) -> Self {
        Self { buffer }
    }

    pub fn fullness(&self) -> f64 {
        let buf = self.buffer.lock();
        fullness(buf.len(), buf.capacity())
    }
}
