//! Custom Axum extractors.

pub mod json;
pub mod owner;
pub mod path;
pub mod query;

pub use json::ValidatedJson;
pub use owner::{OWNER_HEADER, Owner};
pub use path::IdPath;
pub use query::ValidQuery;
