//! # filedeck-entity
//!
//! Domain entity models for FileDeck. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.
//!
//! The [`folder::TreeArena`] holds a whole folder/file graph in memory
//! keyed by id, with parent/child indices, and carries the ancestor-walk
//! and subtree algorithms shared by every persistence backend.

pub mod file;
pub mod folder;
