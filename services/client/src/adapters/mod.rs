pub mod http;
pub mod storage;

pub use http::HttpBackend;
pub use storage::{JsonFileStore, MemoryStore};
