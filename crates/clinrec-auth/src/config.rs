//! Credential manager configuration.
//!
//! Plain serde-deserializable settings with sensible defaults. Loading
//! these from files or the environment is the embedding process's concern.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! session_idle_timeout = "30m"
//!
//! [auth.password]
//! min_length = 8
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Credential manager configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Sliding idle timeout for sessions. Each successful validation
    /// pushes the expiry this far into the future.
    #[serde(with = "humantime_serde")]
    pub session_idle_timeout: Duration,

    /// Password policy applied at registration.
    pub password: PasswordPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_idle_timeout: Duration::from_secs(30 * 60),
            password: PasswordPolicy::default(),
        }
    }
}

/// Structural password requirements.
///
/// Character-class rules (uppercase, lowercase, digit) and the common
/// password deny-list are fixed; only the length bounds are configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum password length in characters.
    pub min_length: usize,
    /// Maximum password length in characters.
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_idle_timeout_is_thirty_minutes() {
        let config = AuthConfig::default();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn deserializes_humantime_durations() {
        let config: AuthConfig =
            serde_json::from_str(r#"{ "session_idle_timeout": "45m" }"#).unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(45 * 60));
        // Unspecified sections fall back to defaults.
        assert_eq!(config.password.min_length, 8);
    }
}
