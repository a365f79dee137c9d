// Input validation for request payloads. Each validator returns every
// message that applies so callers can report them together.

use super::error::{AppError, FieldErrors};

pub const USERNAME_MIN: usize = 2;
pub const USERNAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 8;
pub const CODE_LEN: usize = 6;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 500;

fn is_plain_identifier(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub fn validate_username(username: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let len = username.chars().count();

    if len < USERNAME_MIN {
        errors.push(format!("Username must be at least of length {} characters", USERNAME_MIN));
    }
    if len > USERNAME_MAX {
        errors.push(format!("Username must be of no more length than {} characters", USERNAME_MAX));
    }
    if !is_plain_identifier(username) {
        errors.push("Username must not contain special characters".to_string());
    }
    errors
}

pub fn validate_fullname(fullname: &str) -> Vec<String> {
    if fullname.is_empty() {
        return vec!["Name is required".to_string()];
    }
    if !is_plain_identifier(fullname) {
        return vec!["Name must not contain special characters".to_string()];
    }
    Vec::new()
}

pub fn validate_email(email: &str) -> Vec<String> {
    let valid = !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain
                        .rsplit_once('.')
                        .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                        .unwrap_or(false)
            }
            None => false,
        };

    if valid {
        Vec::new()
    } else {
        vec!["Invalid email address".to_string()]
    }
}

pub fn validate_password(password: &str) -> Vec<String> {
    if password.chars().count() < PASSWORD_MIN {
        vec![format!("Password must be at least of length {} characters", PASSWORD_MIN)]
    } else {
        Vec::new()
    }
}

pub fn validate_verify_code(code: &str) -> Vec<String> {
    if code.len() == CODE_LEN && code.chars().all(|c| c.is_ascii_digit()) {
        Vec::new()
    } else {
        vec![format!("Verification code must be {} digits", CODE_LEN)]
    }
}

pub fn validate_message_content(content: &str) -> Vec<String> {
    let len = content.chars().count();
    let mut errors = Vec::new();

    if len < MESSAGE_MIN {
        errors.push(format!("Message content must be at least of {} characters", MESSAGE_MIN));
    }
    if len > MESSAGE_MAX {
        errors.push(format!("Message content must be of at most {} characters", MESSAGE_MAX));
    }
    errors
}

/// Accumulates per-field errors across several validators.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, field: &str, messages: Vec<String>) -> Self {
        if !messages.is_empty() {
            self.errors.entry(field.to_string()).or_default().extend(messages);
        }
        self
    }

    /// Fails with the given summary message and the collected field errors.
    pub fn finish(self, message: &str) -> Result<(), AppError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(AppError::Validation {
            message: message.to_string(),
            errors: self.errors,
        })
    }

    /// Fails with every collected message joined into the summary.
    pub fn finish_joined(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let message = self
            .errors
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::Validation {
            message,
            errors: self.errors,
        })
    }
}
