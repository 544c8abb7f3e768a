//! # filedeck-database
//!
//! PostgreSQL connection management, migrations, and the persistence
//! layer for the folder/file tree. [`TreeRepository`] is the seam the
//! service layer depends on; [`PgTreeRepository`] is the production
//! backend and [`MemoryTreeRepository`] keeps the whole tree in process.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryTreeRepository;
pub use postgres::PgTreeRepository;
pub use store::{FileFilter, FolderFilter, ParentScope, TreeRepository};
