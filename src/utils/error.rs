use actix_web::{http::StatusCode, HttpResponse};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::ApiResponse;

/// Field name -> validation messages, in the flattened field-error shape
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, errors: FieldErrors },
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    DatabaseError(String),
    MailError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { message, .. } => write!(f, "{}", message),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::MailError(msg) => write!(f, "{}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return AppError::Conflict("User with this username or email already exists".to_string());
        }
        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AppError::DatabaseError(format!("Failed to decode document: {}", err))
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl AppError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.clone()]);
        AppError::Validation { message, errors }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::MailError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Builds the JSON error response. Server-side failures are reported with
    /// `fallback` so driver messages never reach the client.
    pub fn to_response(&self, fallback: &str) -> HttpResponse {
        let body = match self {
            AppError::Validation { message, errors } => {
                ApiResponse::failure(message.clone()).with_errors(errors.clone())
            }
            AppError::MailError(msg) => ApiResponse::failure(msg.clone()),
            e if e.is_server_error() => ApiResponse::failure(fallback),
            e => ApiResponse::failure(e.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::invalid("username", "bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::MailError("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_server_errors_hide_details() {
        let resp = AppError::DatabaseError("connection reset by peer".into())
            .to_response("Error sending message");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Error sending message");
    }

    #[actix_web::test]
    async fn test_validation_error_carries_field_errors() {
        let resp = AppError::invalid("code", "Verification code must be 6 digits").to_response("unused");
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Verification code must be 6 digits");
        assert_eq!(json["errors"]["code"][0], "Verification code must be 6 digits");
    }

    fn write_error(code: i32) -> mongodb::error::Error {
        use mongodb::error::{ErrorKind, WriteError, WriteFailure};

        let write_error: WriteError = mongodb::bson::from_document(mongodb::bson::doc! {
            "code": code,
            "errmsg": "E11000 duplicate key error collection: truefeedback.users index: username_1",
        })
        .unwrap();
        ErrorKind::Write(WriteFailure::WriteError(write_error)).into()
    }

    fn command_error(code: i32) -> mongodb::error::Error {
        use mongodb::error::{CommandError, ErrorKind};

        let command_error: CommandError = mongodb::bson::from_document(mongodb::bson::doc! {
            "code": code,
            "codeName": "DuplicateKey",
        })
        .unwrap();
        ErrorKind::Command(command_error).into()
    }

    #[test]
    fn test_duplicate_key_maps_to_conflict() {
        assert!(matches!(AppError::from(write_error(11000)), AppError::Conflict(_)));
        assert!(matches!(AppError::from(command_error(11000)), AppError::Conflict(_)));
        assert_eq!(
            AppError::from(write_error(11000)).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_other_driver_errors_stay_database_errors() {
        assert!(matches!(AppError::from(write_error(121)), AppError::DatabaseError(_)));
        assert!(matches!(AppError::from(command_error(2)), AppError::DatabaseError(_)));
    }
}
