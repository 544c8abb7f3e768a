//! Folder management and tree services.

pub mod service;
pub mod tree;

pub use service::{CreateFolderRequest, FolderListing, FolderService, RootListing};
pub use tree::TreeService;
