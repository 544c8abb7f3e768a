//! Owner identity extractor.

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use filedeck_core::error::AppError;
use filedeck_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the acting owner's id.
pub const OWNER_HEADER: &str = "x-owner-id";

/// The acting owner, resolved from the `X-Owner-Id` header.
///
/// A missing header is `Unauthorized`; a value that is not a UUID is a
/// `Validation` error.
#[derive(Debug, Clone)]
pub struct Owner(pub RequestContext);

impl Deref for Owner {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OWNER_HEADER)
            .ok_or_else(|| AppError::unauthorized("Missing X-Owner-Id header"))?;

        let owner_id = value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| AppError::validation("X-Owner-Id must be a UUID"))?;

        Ok(Owner(RequestContext::new(owner_id)))
    }
}
