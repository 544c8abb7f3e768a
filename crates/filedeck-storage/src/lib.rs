//! # filedeck-storage
//!
//! Binary content storage for FileDeck. Only the local filesystem provider
//! ships here; other backends plug in through
//! [`filedeck_core::traits::StorageProvider`].

pub mod naming;
pub mod providers;

pub use naming::storage_path_for;
pub use providers::LocalStorageProvider;
