//! Lobby configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_STARTING_BANK: i64 = 5;
pub const DEFAULT_HAND_LIMIT: usize = 5;
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RENDEZVOUS_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-match tunables.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LobbyConfig {
    /// Balance each participant starts with.
    pub starting_bank: i64,

    /// Number of hands after which the match completes.
    pub hand_limit: usize,

    /// How long the coordinator waits for any inbound message before the
    /// match is declared dead.
    pub message_timeout: Duration,

    /// How long a registered participant waits for the second player.
    pub rendezvous_timeout: Duration,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            starting_bank: DEFAULT_STARTING_BANK,
            hand_limit: DEFAULT_HAND_LIMIT,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            rendezvous_timeout: DEFAULT_RENDEZVOUS_TIMEOUT,
        }
    }
}

impl LobbyConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.starting_bank <= 0 {
            return Err("Starting bank must be positive".to_string());
        }

        if self.hand_limit == 0 {
            return Err("Hand limit must be at least 1".to_string());
        }

        if self.message_timeout.is_zero() {
            return Err("Message timeout must be non-zero".to_string());
        }

        if self.rendezvous_timeout.is_zero() {
            return Err("Rendezvous timeout must be non-zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(LobbyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_zero_hand_limit() {
        let config = LobbyConfig {
            hand_limit: 0,
            ..LobbyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let config = LobbyConfig {
            message_timeout: Duration::ZERO,
            ..LobbyConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LobbyConfig {
            rendezvous_timeout: Duration::ZERO,
            ..LobbyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_bank() {
        let config = LobbyConfig {
            starting_bank: 0,
            ..LobbyConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
