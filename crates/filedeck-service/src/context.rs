//! Request context carrying the acting owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// Built by the HTTP layer from the identity header and passed into every
/// service method so each operation knows *whose* tree it acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting owner.
    pub owner_id: Uuid,
    /// Correlation id for logs.
    pub request_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            request_id: Uuid::new_v4(),
            request_time: Utc::now(),
        }
    }

    /// Whether the acting owner owns a record.
    pub fn owns(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }
}
