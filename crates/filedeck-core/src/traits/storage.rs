//! Storage provider trait for file content backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for file content storage.
///
/// Paths are provider-relative and opaque to callers; the Tree Store
/// assigns them once at upload time. Only the local filesystem
/// implementation ships with FileDeck, in `filedeck-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes to the given path and return the path written.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<String>;

    /// Read a stored object into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Delete the object at the given path.
    ///
    /// Returns a `NotFound` error when nothing is stored at `path`, so that
    /// callers doing best-effort cleanup can tell "already gone" apart from
    /// an I/O failure.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
