use std::env;
use std::ops::RangeInclusive;

use crate::utils::AppError;

const SESSION_MAX_AGE_RANGE: RangeInclusive<i64> = 1..=3650;

/// JWT signing settings
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub max_age_days: i64,
}

/// Outbound mail settings. No API key means codes are only logged.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub resend_api_key: Option<String>,
    pub from: String,
}

/// Application configuration, read once from the environment at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub db_name: String,
    pub jwt: JwtSettings,
    pub mail: MailSettings,
    pub app_base_url: String,
    pub allowed_origins: Vec<String>,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Internal(format!("{} must be set", key)))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let port = var_or("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| AppError::Internal(format!("Invalid PORT: {}", e)))?;

        let max_age_days = parse_session_max_age(&var_or("SESSION_MAX_AGE_DAYS", "30"))?;

        let allowed_origins = parse_origins(&var_or("ALLOWED_ORIGINS", "http://localhost:3000"));

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port,
            mongodb_uri: required("MONGODB_URI")?,
            db_name: var_or("DB_NAME", "truefeedback"),
            jwt: JwtSettings {
                secret: required("JWT_SECRET")?,
                issuer: var_or("JWT_ISSUER", "true-feedback"),
                audience: var_or("JWT_AUDIENCE", "true-feedback-api"),
                max_age_days,
            },
            mail: MailSettings {
                resend_api_key: env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty()),
                from: var_or("RESEND_FROM", "True Feedback <onboarding@resend.dev>"),
            },
            app_base_url: var_or("APP_BASE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            allowed_origins,
        })
    }

    /// Shareable link visitors use to leave a message for `username`
    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/u/{}", self.app_base_url, urlencoding::encode(username))
    }
}

/// Session lifetime in days, limited to 1..=3650
fn parse_session_max_age(raw: &str) -> Result<i64, AppError> {
    let days = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| AppError::Internal(format!("Invalid SESSION_MAX_AGE_DAYS: {}", e)))?;

    if !SESSION_MAX_AGE_RANGE.contains(&days) {
        return Err(AppError::Internal(format!(
            "SESSION_MAX_AGE_DAYS must be between {} and {}, got {}",
            SESSION_MAX_AGE_RANGE.start(),
            SESSION_MAX_AGE_RANGE.end(),
            days
        )));
    }
    Ok(days)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 3000,
        mongodb_uri: "mongodb://localhost:27017".to_string(),
        db_name: "truefeedback_test".to_string(),
        jwt: JwtSettings {
            secret: "test-secret".to_string(),
            issuer: "true-feedback".to_string(),
            audience: "true-feedback-api".to_string(),
            max_age_days: 30,
        },
        mail: MailSettings {
            resend_api_key: None,
            from: "test@example.com".to_string(),
        },
        app_base_url: "https://feedback.example.com".to_string(),
        allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins(" http://a.com/, ,http://b.com ");
        assert_eq!(origins, vec!["http://a.com", "http://b.com"]);
    }

    #[test]
    fn test_session_max_age_must_be_in_range() {
        assert_eq!(parse_session_max_age("30").unwrap(), 30);
        assert_eq!(parse_session_max_age(" 3650 ").unwrap(), 3650);
        assert!(parse_session_max_age("0").is_err());
        assert!(parse_session_max_age("-1").is_err());
        assert!(parse_session_max_age("100000000").is_err());
        assert!(parse_session_max_age("thirty").is_err());
    }

    #[test]
    fn test_profile_url_encodes_username() {
        let config = test_config();
        assert_eq!(config.profile_url("john_doe"), "https://feedback.example.com/u/john_doe");
        assert_eq!(config.profile_url("a b"), "https://feedback.example.com/u/a%20b");
    }
}
