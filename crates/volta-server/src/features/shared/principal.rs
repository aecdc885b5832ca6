//! Principal extraction from identity headers
//!
//! Authentication itself happens upstream; the authenticating reverse proxy
//! asserts the caller's identity via `x-user-id` (and `x-user-staff` for
//! staff accounts). Requests without the header are anonymous.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::api::response::ErrorResponse;

pub use super::access::Principal;

/// Rejection returned when identity headers are present but malformed
#[derive(Debug)]
pub struct InvalidPrincipal(String);

impl IntoResponse for InvalidPrincipal {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new("VALIDATION_ERROR", self.0);
        (StatusCode::BAD_REQUEST, Json(error)).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = InvalidPrincipal;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get("x-user-id") else {
            return Ok(Principal::Anonymous);
        };

        let raw = raw
            .to_str()
            .map_err(|_| InvalidPrincipal("x-user-id header is not valid UTF-8".to_string()))?;
        let id = Uuid::parse_str(raw)
            .map_err(|_| InvalidPrincipal(format!("Invalid x-user-id header: {}", raw)))?;

        let is_staff = parts
            .headers
            .get("x-user-staff")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Principal::User { id, is_staff })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Principal, InvalidPrincipal> {
        let (mut parts, _) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let request = Request::builder().body(()).unwrap();
        let principal = extract(request).await.unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }

    #[tokio::test]
    async fn test_user_header() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header("x-user-id", id.to_string())
            .body(())
            .unwrap();
        let principal = extract(request).await.unwrap();
        assert_eq!(principal, Principal::User { id, is_staff: false });
    }

    #[tokio::test]
    async fn test_staff_header() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header("x-user-id", id.to_string())
            .header("x-user-staff", "true")
            .body(())
            .unwrap();
        let principal = extract(request).await.unwrap();
        assert!(principal.is_staff());
    }

    #[tokio::test]
    async fn test_malformed_user_id_rejected() {
        let request = Request::builder()
            .header("x-user-id", "not-a-uuid")
            .body(())
            .unwrap();
        assert!(extract(request).await.is_err());
    }

    #[tokio::test]
    async fn test_staff_flag_without_user_is_anonymous() {
        let request = Request::builder()
            .header("x-user-staff", "true")
            .body(())
            .unwrap();
        let principal = extract(request).await.unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }
}
