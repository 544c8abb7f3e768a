//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{CreateFolder, Folder, FolderPatch};
pub use tree::{FolderNode, Subtree, TreeArena, ancestor_chain, check_reparent};
