pub mod progress;
pub mod ring_buffer;
