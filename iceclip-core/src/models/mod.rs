pub mod audio_models;
pub mod clip_result;
pub mod config;
pub mod error;
pub mod state;
