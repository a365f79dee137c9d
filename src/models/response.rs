use serde::Serialize;

use crate::utils::FieldErrors;

/// Envelope shared by every JSON endpoint: `success`, `message`, then any
/// payload fields flattened alongside.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize = ()> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            data: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Flag {
        is_accepting_messages: bool,
    }

    #[test]
    fn test_payload_is_flattened() {
        let resp = ApiResponse::with_data("ok", Flag { is_accepting_messages: true });
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["is_accepting_messages"], true);
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_plain_message() {
        let json = serde_json::to_value(ApiResponse::failure("Username is taken")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "Username is taken" }));
    }
}
