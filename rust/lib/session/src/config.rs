use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default polling period for the session monitor (seconds).
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 5;

/// Default login location.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Session core configuration.
///
/// Usually embedded in a larger TOML file; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How often the monitor re-checks token expiry.
    pub check_interval_secs: u64,

    /// Where expired or unauthenticated sessions are sent.
    pub login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse configuration from command-line arguments.
    ///
    /// Supported flags:
    /// - `--session-check-interval=SECS`
    /// - `--login-path=PATH`
    ///
    /// Unknown arguments are ignored.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut config = SessionConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--session-check-interval=") {
                config.check_interval_secs = val
                    .parse()
                    .map_err(|_| ConfigError::InvalidInterval(val.to_string()))?;
            } else if let Some(val) = arg.strip_prefix("--login-path=") {
                config.login_path = val.to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Login location, flagged when the previous session expired.
    pub fn login_location(&self, expired: bool) -> String {
        if !expired {
            return self.login_path.clone();
        }
        let sep = if self.login_path.contains('?') { '&' } else { '?' };
        format!("{}{}expired=true", self.login_path, sep)
    }
}
