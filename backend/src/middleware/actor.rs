//! Acting-user extraction
//!
//! Authentication happens upstream; this only reads who the caller says
//! they are so ledger records can be attributed.

use axum::http::request::Parts;

use crate::error::AppError;
use crate::models::Actor;

/// Header carrying the acting user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the acting user's display name
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Extractor for the acting user.
/// Missing headers resolve to the `system` actor.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Actor);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let user_id = match header(USER_ID_HEADER) {
            Some(raw) => Some(
                uuid::Uuid::parse_str(raw)
                    .map_err(|_| AppError::validation(USER_ID_HEADER, "Invalid user id header"))?,
            ),
            None => None,
        };

        let actor = match header(USER_NAME_HEADER) {
            Some(name) => Actor::new(user_id, name),
            None if user_id.is_some() => Actor::new(user_id, "unknown"),
            None => Actor::system(),
        };

        Ok(CurrentUser(actor))
    }
}
