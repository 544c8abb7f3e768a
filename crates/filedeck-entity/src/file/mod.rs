//! File domain entities.

pub mod kind;
pub mod model;

pub use kind::{FileKind, resolve_mime};
pub use model::{CreateFile, File, FilePatch, format_size};
