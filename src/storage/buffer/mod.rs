pub mod error;
pub mod lru_cache;
pub mod manager;

pub use error::{BufferPoolError, CacheError};
pub use lru_cache::LruCache;
pub use manager::BufferPool;
