use common::DocumentId;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("this request requires a signed-in session")]
    Unauthenticated,
    #[error("{method} {path} returned {status}: {message}")]
    Status {
        method: String,
        path: String,
        status: u16,
        message: String,
    },
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed decoding response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid request url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed building http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid upload part for {file_name}: {source}")]
    Multipart {
        file_name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("position {position_id} lists document id {id} more than once")]
    DuplicateDocumentId { position_id: i64, id: DocumentId },
    #[error("local documents of position {position_id} repeat id {id}")]
    DuplicateLocalDocumentId { position_id: i64, id: DocumentId },
    #[error("document sync aborted at position {position_id}: {source}")]
    PositionSync {
        position_id: i64,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::PositionSync { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthenticated) || matches!(self.status(), Some(401))
    }
}

/// Pulls a human message out of an error body: JSON `message` or `error`,
/// else the trimmed text, else the status reason.
pub(crate) fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str)
                && !text.trim().is_empty()
            {
                return text.trim().to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("request failed").to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, error_message};

    #[test]
    fn prefers_json_message_then_error_field() {
        assert_eq!(
            error_message(r#"{"message":"Invalid credentials"}"#, Some("Unauthorized")),
            "Invalid credentials"
        );
        assert_eq!(
            error_message(r#"{"error":"batch not found"}"#, None),
            "batch not found"
        );
    }

    #[test]
    fn falls_back_to_text_then_reason() {
        assert_eq!(error_message("  gateway down \n", None), "gateway down");
        assert_eq!(error_message("", Some("Not Found")), "Not Found");
        assert_eq!(error_message(r#"{"message":""}"#, Some("Bad Request")), r#"{"message":""}"#);
    }

    #[test]
    fn status_reaches_through_position_wrapper() {
        let err = ApiError::PositionSync {
            position_id: 7,
            source: Box::new(ApiError::Status {
                method: "POST".to_string(),
                path: "/companies/batch/2025/position/7/documents".to_string(),
                status: 401,
                message: "expired".to_string(),
            }),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
        assert!(ApiError::Unauthenticated.is_unauthorized());
    }
}
