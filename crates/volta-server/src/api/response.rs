//! API response envelopes
//!
//! Every JSON body leaving the server is either an [`ApiResponse`] or an
//! [`ErrorResponse`], so clients can branch on the `success` flag before
//! looking at anything else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success envelope: `{success: true, data, meta?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    /// Attach a metadata block (pagination, counts) alongside the data
    pub fn success_with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            meta: Some(meta),
            ..Self::success(data)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Error envelope: `{success: false, error: {code, message}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

/// Machine-readable code plus human-readable message
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        let mut response = Self::new(code, message);
        response.error.details = Some(details);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn test_success_with_meta() {
        let json = serde_json::to_value(ApiResponse::success_with_meta(
            "row",
            serde_json::json!({"total": 1}),
        ))
        .unwrap();
        assert_eq!(json["meta"]["total"], 1);
    }

    #[test]
    fn test_error_envelope() {
        let json = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "Dataset not found"))
            .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Dataset not found");
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_error_with_details() {
        let json = serde_json::to_value(ErrorResponse::with_details(
            "VALIDATION_ERROR",
            "Bad field",
            serde_json::json!({"field": "delimiter"}),
        ))
        .unwrap();
        assert_eq!(json["error"]["details"]["field"], "delimiter");
    }
}
