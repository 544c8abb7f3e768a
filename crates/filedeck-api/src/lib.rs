//! # filedeck-api
//!
//! HTTP API layer for FileDeck built on Axum.
//!
//! Provides the REST endpoints for the folder tree and file content,
//! the owner identity extractor, request validation, middleware (CORS,
//! compression, request logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
