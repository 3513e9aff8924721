use std::time::Duration;

use serde::Serialize;

use crate::claims::Claims;
use crate::error::TokenError;

/// Result of checking a decoded token against a point in time.
///
/// `Invalid` and `Expired` are handled identically by every consumer; they
/// are kept apart only for logging and for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExpiryStatus {
    #[serde(rename_all = "camelCase")]
    Valid { remaining_seconds: i64 },
    Expired,
    Invalid,
}

impl ExpiryStatus {
    /// Evaluate a decode result at `now` (unix seconds).
    ///
    /// - decode failure → `Invalid`
    /// - no `exp` claim → `Expired`
    /// - `exp <= now` → `Expired`
    /// - otherwise → `Valid { remaining_seconds: exp - now }`
    pub fn evaluate(decoded: &Result<Claims, TokenError>, now: i64) -> Self {
        let claims = match decoded {
            Ok(claims) => claims,
            Err(_) => return ExpiryStatus::Invalid,
        };
        match claims.exp {
            Some(exp) if exp > now => ExpiryStatus::Valid {
                remaining_seconds: exp.saturating_sub(now),
            },
            _ => ExpiryStatus::Expired,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ExpiryStatus::Valid { .. })
    }

    /// Remaining lifetime, `None` unless valid.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            ExpiryStatus::Valid { remaining_seconds } => {
                Some(Duration::from_secs(*remaining_seconds as u64))
            }
            _ => None,
        }
    }

    /// Short lowercase label, as used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::Valid { .. } => "valid",
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::Invalid => "invalid",
        }
    }
}

/// Render a remaining duration as `1h 2m 5s`.
///
/// Leading zero units are dropped (`2m 5s`, `5s`); inner zeros are kept
/// (`1h 0m 5s`). Non-positive input renders as `0s`.
pub fn format_remaining(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::decode_token;
    use crate::token::test_tokens::*;

    fn at(token: &str, now: i64) -> ExpiryStatus {
        ExpiryStatus::evaluate(&decode_token(Some(token)), now)
    }

    // ========================================================================
    // evaluate
    // ========================================================================

    #[test]
    fn boundary_around_exp() {
        let token = expiring_at(1000);
        assert_eq!(at(&token, 999), ExpiryStatus::Valid { remaining_seconds: 1 });
        assert_eq!(at(&token, 1000), ExpiryStatus::Expired);
        assert_eq!(at(&token, 1001), ExpiryStatus::Expired);
    }

    #[test]
    fn remaining_is_exp_minus_now() {
        let token = expiring_at(10_000);
        for now in [0, 1, 5_000, 9_999] {
            assert_eq!(
                at(&token, now),
                ExpiryStatus::Valid {
                    remaining_seconds: 10_000 - now
                }
            );
        }
    }

    #[test]
    fn missing_exp_is_expired_for_any_now() {
        let token = with_payload(r#"{"sub":"u-1"}"#);
        for now in [i64::MIN, -1, 0, 1, i64::MAX] {
            assert_eq!(at(&token, now), ExpiryStatus::Expired);
        }
    }

    #[test]
    fn decode_failure_is_invalid() {
        assert_eq!(at("garbage", 0), ExpiryStatus::Invalid);
        assert_eq!(
            ExpiryStatus::evaluate(&Err(TokenError::Missing), 0),
            ExpiryStatus::Invalid
        );
    }

    #[test]
    fn evaluate_is_repeatable() {
        let token = expiring_at(1000);
        assert_eq!(at(&token, 500), at(&token, 500));
    }

    #[test]
    fn accessors() {
        let valid = ExpiryStatus::Valid { remaining_seconds: 90 };
        assert!(valid.is_valid());
        assert_eq!(valid.remaining(), Some(Duration::from_secs(90)));
        assert_eq!(valid.label(), "valid");

        assert!(!ExpiryStatus::Expired.is_valid());
        assert_eq!(ExpiryStatus::Expired.remaining(), None);
        assert_eq!(ExpiryStatus::Invalid.label(), "invalid");
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(ExpiryStatus::Valid { remaining_seconds: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "valid", "remainingSeconds": 3}));
        let json = serde_json::to_value(ExpiryStatus::Expired).unwrap();
        assert_eq!(json, serde_json::json!({"status": "expired"}));
    }

    // ========================================================================
    // format_remaining
    // ========================================================================

    #[test]
    fn format_drops_leading_zero_units() {
        assert_eq!(format_remaining(3725), "1h 2m 5s");
        assert_eq!(format_remaining(125), "2m 5s");
        assert_eq!(format_remaining(5), "5s");
    }

    #[test]
    fn format_keeps_inner_zeros() {
        assert_eq!(format_remaining(3600), "1h 0m 0s");
        assert_eq!(format_remaining(3605), "1h 0m 5s");
        assert_eq!(format_remaining(60), "1m 0s");
    }

    #[test]
    fn format_non_positive() {
        assert_eq!(format_remaining(0), "0s");
        assert_eq!(format_remaining(-30), "0s");
    }

    #[test]
    fn format_many_hours() {
        assert_eq!(format_remaining(90_061), "25h 1m 1s");
    }
}
