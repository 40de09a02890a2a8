pub mod capture_delegate;
pub mod chunk_source;
