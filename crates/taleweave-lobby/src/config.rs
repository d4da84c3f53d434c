//! Session policy configuration.

use std::time::Duration;

/// Tunables shared by every lobby spawned from one registry.
///
/// `max_players` is not here — it is chosen per lobby at creation time
/// and immutable afterwards.
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// Minimum roster size for `start_adventure` to succeed.
    /// Lowering this to 1 allows solo sessions.
    pub min_players_to_start: usize,

    /// Capacity of each lobby actor's command channel.
    pub command_buffer: usize,

    /// Capacity of each connection's outbound message channel.
    pub outbound_buffer: usize,

    /// How long a broadcast may wait on one connection's outbound
    /// channel before that connection is treated as disconnected.
    pub delivery_timeout: Duration,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            min_players_to_start: 2,
            command_buffer: 64,
            outbound_buffer: 32,
            delivery_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LobbyConfig::default();
        assert_eq!(config.min_players_to_start, 2);
        assert!(config.outbound_buffer > 0);
        assert!(config.delivery_timeout > Duration::ZERO);
    }
}
