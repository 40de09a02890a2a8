use std::collections::VecDeque;

use crate::models::audio_models::AudioChunk;

/// Number of chunks that cover a window of `window_minutes`.
///
/// `floor((window_minutes / 2) * 60 * sample_rate / chunk_size)`. The window
/// is halved: a 2 minute setting keeps 1 minute of 48 kHz-sized chunks.
pub fn window_capacity(window_minutes: u32, sample_rate: u32, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    let numerator = window_minutes as u64 * 60 * sample_rate as u64;
    let denominator = 2 * chunk_size as u64;
    (numerator / denominator) as usize
}

/// Time-windowed FIFO of stream chunks.
///
/// Capacity is expressed in chunks but derived from the window length, so
/// changing the window changes the capacity. Overflow drops the oldest
/// chunks as one block. A shrink is only enforced by the next `push`.
///
/// Not synchronized; the engine shares it as
/// `Arc<parking_lot::Mutex<RingBuffer>>`.
#[derive(Debug)]
pub struct RingBuffer {
    chunks: VecDeque<AudioChunk>,
    window_minutes: u32,
    sample_rate: u32,
    chunk_size: usize,
    total_bytes: usize,
}

impl RingBuffer {
    pub fn new(window_minutes: u32, sample_rate: u32, chunk_size: usize) -> Self {
        let capacity = window_capacity(window_minutes, sample_rate, chunk_size);
        Self {
            // Cap the up-front allocation; long windows grow on demand.
            chunks: VecDeque::with_capacity(capacity.min(64 * 1024)),
            window_minutes,
            sample_rate,
            chunk_size,
            total_bytes: 0,
        }
    }

    /// Append a chunk, then drop the oldest chunks beyond capacity.
    pub fn push(&mut self, chunk: AudioChunk) {
        self.total_bytes += chunk.len();
        self.chunks.push_back(chunk);

        let capacity = self.capacity();
        if self.chunks.len() > capacity {
            let excess = self.chunks.len() - capacity;
            let dropped: usize = self.chunks.drain(..excess).map(|c| c.len()).sum();
            self.total_bytes -= dropped;
            if excess > 1 {
                log::debug!("trimmed {} chunks to fit capacity {}", excess, capacity);
            }
        }
    }

    /// Ordered copy of the current contents.
    ///
    /// Chunks share their bytes with the buffer, so this is a pointer copy.
    /// Later pushes or clears do not affect the returned vector.
    pub fn snapshot_contents(&self) -> Vec<AudioChunk> {
        self.chunks.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }

    /// Number of chunks currently held.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sum of the byte lengths of all held chunks.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Maximum number of chunks for the current window. May be zero.
    pub fn capacity(&self) -> usize {
        window_capacity(self.window_minutes, self.sample_rate, self.chunk_size)
    }

    pub fn window_minutes(&self) -> u32 {
        self.window_minutes
    }

    /// Change the window length. Existing chunks are kept until the next push.
    pub fn set_window_minutes(&mut self, window_minutes: u32) {
        self.window_minutes = window_minutes;
    }
}
