//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed cooldown before the single reconnect-and-retry attempt.
pub const DEFAULT_RETRY_COOLDOWN: Duration = Duration::from_secs(5);

/// Configuration for a [`StoreClient`].
///
/// [`StoreClient`]: crate::StoreClient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// How long to wait after a failed attempt before renewing the
    /// connection and retrying once.
    pub retry_cooldown: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry_cooldown: DEFAULT_RETRY_COOLDOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cooldown_is_five_seconds() {
        assert_eq!(ClientConfig::default().retry_cooldown, Duration::from_secs(5));
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = ClientConfig {
            retry_cooldown: Duration::from_millis(250),
        };
        let raw = serde_json::to_string(&config).unwrap();
        let back: ClientConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, config);
    }
}
