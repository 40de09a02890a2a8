pub mod cancel;
pub mod engine;
