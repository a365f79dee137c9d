use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Codes stay valid for one hour after they are issued
pub const VERIFICATION_CODE_TTL_MINUTES: i64 = 60;

/// Six-digit numeric one-time code, never starting with zero
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

pub fn verification_code_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_digits() {
        for _ in 0..200 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_expiry_is_one_hour_out() {
        let now = Utc::now();
        assert_eq!(verification_code_expiry(now) - now, Duration::hours(1));
    }
}
