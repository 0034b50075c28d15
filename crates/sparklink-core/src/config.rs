//! Engine configuration.

use std::time::Duration;

use thiserror::Error;

use crate::{chat::DEFAULT_CANNED_REPLY, prompt::DEFAULT_PROMPTS};

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A delay was negative, NaN or infinite.
    #[error("{name} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDelay {
        /// Option name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// A delay exceeded [`MAX_DELAY`].
    #[error("{name} must be at most {} seconds", max.as_secs())]
    DelayTooLarge {
        /// Option name.
        name: &'static str,
        /// Largest accepted delay.
        max: Duration,
    },

    /// The canned reply was blank.
    #[error("canned reply must not be blank")]
    BlankCannedReply,
}

/// Longest accepted discovery or reply delay.
///
/// Keeps every deadline representable as an `Instant`.
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// How discovered peers are synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerSelection {
    /// Always the same profile.
    #[default]
    Fixed,
    /// Uniform pick from the built-in catalogue.
    Catalog,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Delay between activating the beacon and a peer being found.
    pub discovery_delay: Duration,
    /// Delay between a user message and the scripted reply.
    pub reply_delay: Duration,
    /// Conversation starters; an empty pool falls back to a default literal.
    pub prompt_pool: Vec<String>,
    /// Text of the scripted reply.
    pub canned_reply: String,
    /// Peer synthesis strategy.
    pub peer_selection: PeerSelection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            discovery_delay: Duration::from_secs(2),
            reply_delay: Duration::from_millis(1500),
            prompt_pool: DEFAULT_PROMPTS.iter().map(|prompt| (*prompt).to_string()).collect(),
            canned_reply: DEFAULT_CANNED_REPLY.to_string(),
            peer_selection: PeerSelection::Fixed,
        }
    }
}

impl EngineConfig {
    /// Set the discovery delay.
    #[must_use]
    pub fn with_discovery_delay(mut self, delay: Duration) -> Self {
        self.discovery_delay = delay;
        self
    }

    /// Set the reply delay.
    #[must_use]
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Replace the prompt pool.
    #[must_use]
    pub fn with_prompt_pool(mut self, pool: Vec<String>) -> Self {
        self.prompt_pool = pool;
        self
    }

    /// Replace the canned reply.
    #[must_use]
    pub fn with_canned_reply(mut self, reply: impl Into<String>) -> Self {
        self.canned_reply = reply.into();
        self
    }

    /// Set the peer synthesis strategy.
    #[must_use]
    pub fn with_peer_selection(mut self, selection: PeerSelection) -> Self {
        self.peer_selection = selection;
        self
    }

    /// Check the configuration before building an engine from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_delay("discovery delay", self.discovery_delay)?;
        check_delay("reply delay", self.reply_delay)?;
        if self.canned_reply.trim().is_empty() {
            return Err(ConfigError::BlankCannedReply);
        }
        Ok(())
    }
}

/// Convert user-supplied seconds into a [`Duration`] no longer than
/// [`MAX_DELAY`].
pub fn delay_from_secs(name: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    let delay = Duration::try_from_secs_f64(secs)
        .map_err(|_| ConfigError::InvalidDelay { name, value: secs })?;
    check_delay(name, delay)?;
    Ok(delay)
}

fn check_delay(name: &'static str, delay: Duration) -> Result<(), ConfigError> {
    if delay > MAX_DELAY {
        return Err(ConfigError::DelayTooLarge { name, max: MAX_DELAY });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.discovery_delay, Duration::from_secs_f64(2.0));
        assert_eq!(config.reply_delay, Duration::from_secs_f64(1.5));
        assert_eq!(config.prompt_pool.len(), 3);
        assert_eq!(config.peer_selection, PeerSelection::Fixed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let config = EngineConfig::default()
            .with_discovery_delay(Duration::from_millis(10))
            .with_reply_delay(Duration::ZERO)
            .with_prompt_pool(vec!["hi".into()])
            .with_canned_reply("pong")
            .with_peer_selection(PeerSelection::Catalog);

        assert_eq!(config.discovery_delay, Duration::from_millis(10));
        assert_eq!(config.reply_delay, Duration::ZERO);
        assert_eq!(config.prompt_pool, vec!["hi".to_string()]);
        assert_eq!(config.canned_reply, "pong");
        assert_eq!(config.peer_selection, PeerSelection::Catalog);
    }

    #[test]
    fn blank_canned_reply_rejected() {
        let config = EngineConfig::default().with_canned_reply("  ");
        assert_eq!(config.validate(), Err(ConfigError::BlankCannedReply));
    }

    #[test]
    fn oversized_delays_rejected() {
        let too_long = MAX_DELAY + Duration::from_secs(1);
        let config = EngineConfig::default().with_discovery_delay(too_long);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DelayTooLarge { name: "discovery delay", max: MAX_DELAY })
        );

        let config = EngineConfig::default().with_reply_delay(Duration::MAX);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DelayTooLarge { name: "reply delay", .. })
        ));

        assert!(EngineConfig::default().with_reply_delay(MAX_DELAY).validate().is_ok());
    }

    #[test]
    fn delay_conversion() {
        assert_eq!(delay_from_secs("reply_delay", 1.5), Ok(Duration::from_millis(1500)));
        assert_eq!(delay_from_secs("reply_delay", 0.0), Ok(Duration::ZERO));
        assert!(matches!(
            delay_from_secs("discovery_delay", -1.0),
            Err(ConfigError::InvalidDelay { name: "discovery_delay", .. })
        ));
        assert!(delay_from_secs("discovery_delay", f64::NAN).is_err());
        assert!(delay_from_secs("discovery_delay", f64::INFINITY).is_err());
        assert_eq!(
            delay_from_secs("discovery_delay", 1e19),
            Err(ConfigError::DelayTooLarge { name: "discovery_delay", max: MAX_DELAY })
        );
        assert_eq!(delay_from_secs("reply_delay", 86_400.0), Ok(MAX_DELAY));
    }
}
