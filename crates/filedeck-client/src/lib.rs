//! # filedeck-client
//!
//! Client side of FileDeck: a typed [`ApiClient`] for the HTTP API and a
//! [`TransferCoordinator`] that runs queued uploads one at a time,
//! tracking per-item status and progress.

pub mod api;
pub mod models;
pub mod source;
pub mod transfer;

pub use api::ApiClient;
pub use models::{DeleteReport, FileInfo, FolderContents, RootContents};
pub use source::{ProgressFn, UploadSource};
pub use transfer::{
    TransferCoordinator, TransferError, TransferEvent, TransferItem, TransferOptions,
    TransferReport, TransferStatus, Uploader,
};
