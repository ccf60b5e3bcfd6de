use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Failures of an ingestion cycle or of a history query.
///
/// Every variant is fatal to the request that produced it. Nothing is written
/// to either history store once one of these has been raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The report date cell is blank or not in the expected format (422)
    DateFormat { raw: String },
    /// The uploaded workbook does not have the expected sheet or shape (422)
    LayoutMismatch { expected: String, found: String },
    /// The upload itself is unusable: missing, wrong extension, unreadable (400)
    InvalidUpload { message: String },
    /// A trend column that is not one of the numeric metric columns (400)
    InvalidColumn { column: String },
    /// A reset request without both confirmation signals (400)
    ResetConfirmation { message: String },
    /// A history table could not be read or written (500)
    Persistence { operation: String, message: String },
    /// Anything else (500)
    Internal { message: String },
}

impl ReportError {
    pub fn persistence(operation: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Persistence {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    fn code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::DateFormat { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "DATE_FORMAT_ERROR"),
            Self::LayoutMismatch { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "LAYOUT_MISMATCH"),
            Self::InvalidUpload { .. } => (StatusCode::BAD_REQUEST, "INVALID_UPLOAD"),
            Self::InvalidColumn { .. } => (StatusCode::BAD_REQUEST, "INVALID_COLUMN"),
            Self::ResetConfirmation { .. } => (StatusCode::BAD_REQUEST, "RESET_NOT_CONFIRMED"),
            Self::Persistence { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::DateFormat { .. } => "DateFormat",
            Self::LayoutMismatch { .. } => "LayoutMismatch",
            Self::InvalidUpload { .. } => "InvalidUpload",
            Self::InvalidColumn { .. } => "InvalidColumn",
            Self::ResetConfirmation { .. } => "ResetConfirmation",
            Self::Persistence { .. } => "Persistence",
            Self::Internal { .. } => "Internal",
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::DateFormat { raw } => {
                write!(
                    f,
                    "Report date '{raw}' is not a date like '31 January 2026'; correct the date cell and upload again"
                )
            }
            ReportError::LayoutMismatch { expected, found } => {
                write!(f, "Report layout mismatch: expected {expected}, found {found}")
            }
            ReportError::InvalidUpload { message } => write!(f, "Invalid upload: {message}"),
            ReportError::InvalidColumn { column } => {
                write!(f, "'{column}' is not a numeric metric column")
            }
            ReportError::ResetConfirmation { message } => {
                write!(f, "Reset not confirmed: {message}")
            }
            ReportError::Persistence { operation, message } => {
                write!(f, "Failed to {operation}: {message}")
            }
            ReportError::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.code();

        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::warn!("{self}");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "type": self.kind(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for ingestion and history operations
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    #[tokio::test]
    async fn test_date_error_surfaces_raw_cell() {
        let response = ReportError::DateFormat {
            raw: "2026/01/31".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "DATE_FORMAT_ERROR");
        assert_eq!(body["error"]["type"], "DateFormat");
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("2026/01/31")
        );
    }

    #[test]
    fn test_status_codes() {
        let layout = ReportError::LayoutMismatch {
            expected: "sheet 'TBC DOR'".to_string(),
            found: "sheets [\"Sheet1\"]".to_string(),
        };
        assert_eq!(layout.code().0, StatusCode::UNPROCESSABLE_ENTITY);

        let persistence = ReportError::persistence("save well history", "disk full");
        assert_eq!(persistence.code().0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            persistence.to_string(),
            "Failed to save well history: disk full"
        );

        let reset = ReportError::ResetConfirmation {
            message: "not acknowledged".to_string(),
        };
        assert_eq!(reset.code(), (StatusCode::BAD_REQUEST, "RESET_NOT_CONFIRMED"));
    }
}
