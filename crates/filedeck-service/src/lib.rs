//! # filedeck-service
//!
//! The Tree Store: folder and file use cases over a [`TreeRepository`]
//! and a [`StorageProvider`]. Every operation takes a [`RequestContext`]
//! naming the acting owner. Records of other owners resolve only when
//! public, and then only for reads.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.
//!
//! [`TreeRepository`]: filedeck_database::TreeRepository
//! [`StorageProvider`]: filedeck_core::traits::StorageProvider

pub mod context;
pub mod file;
pub mod folder;
pub mod outcome;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use context::RequestContext;
pub use file::{DownloadService, FileService, UploadService};
pub use folder::{FolderService, TreeService};
pub use outcome::{DeleteOutcome, StorageFailure};
