//! Core traits defined in `filedeck-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
