pub mod clip_writer;
pub mod metadata;
