//! Discovery session state machine.
//!
//! Owns the beacon state and the zero-or-one "peer found" transition.
//!
//! # State Machine
//!
//! ```text
//!            activate              timer(token)
//! ┌─────────┐ ────────> ┌──────────┐ ─────────> ┌───────┐
//! │ Dormant │           │ Scanning │            │ Found │
//! └─────────┘ <──────── └──────────┘            └───────┘
//!      ^       deactivate                           │
//!      └────────────────────────────────────────────┘
//!                        deactivate
//! ```
//!
//! Each activation mints a fresh [`ActivationToken`] and asks the caller to
//! schedule a one-shot timer carrying it. Deactivation forgets the token, so
//! a timer that arrives afterwards no longer matches and is dropped.

use std::{fmt, time::Duration};

use rand::RngCore;
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    error::EngineError,
    peer::{PeerFactory, PeerId, PeerProfile},
    prompt::PromptGenerator,
    token::ActivationToken,
};

/// Beacon state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryStatus {
    /// Beacon off.
    #[default]
    Dormant,
    /// Beacon on, no peer yet.
    Scanning,
    /// Beacon on, a peer is visible.
    Found,
}

impl DiscoveryStatus {
    /// Status line shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dormant => "Spark Dormant",
            Self::Scanning => "Scanning Safe Zone...",
            Self::Found => "Spark Found! Tap to Connect",
        }
    }

    /// Whether the beacon is on.
    pub fn is_active(self) -> bool {
        self != Self::Dormant
    }
}

impl fmt::Display for DiscoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dormant => "dormant",
            Self::Scanning => "scanning",
            Self::Found => "found",
        })
    }
}

/// Actions returned by the discovery state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryAction {
    /// Schedule a one-shot timer that delivers `token` after `delay`.
    ScheduleDiscovery {
        /// Token of the scan that scheduled the timer.
        token: ActivationToken,
        /// Delay before the timer fires.
        delay: Duration,
    },

    /// A peer became visible.
    PeerFound {
        /// Identifier of the discovered peer.
        peer: PeerId,
    },

    /// The beacon went dormant; any open chat must be torn down.
    TeardownChat,
}

/// Discovery session.
///
/// Created once per application session. Status changes only through
/// [`activate`](Self::activate), [`deactivate`](Self::deactivate) and
/// [`on_timer_fired`](Self::on_timer_fired).
#[derive(Debug, Clone)]
pub struct DiscoverySession {
    status: DiscoveryStatus,
    /// Last token handed out. Monotonic for the lifetime of the session.
    last_token: ActivationToken,
    /// Token of the live scan; `None` while dormant.
    active_token: Option<ActivationToken>,
    nearby: Vec<PeerProfile>,
    prompt: Option<String>,
    prompts: PromptGenerator,
    discovery_delay: Duration,
}

impl DiscoverySession {
    /// Create a dormant session.
    pub fn new(prompts: PromptGenerator, discovery_delay: Duration) -> Self {
        Self {
            status: DiscoveryStatus::Dormant,
            last_token: ActivationToken::zero(),
            active_token: None,
            nearby: Vec::new(),
            prompt: None,
            prompts,
            discovery_delay,
        }
    }

    /// Create a dormant session from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(PromptGenerator::new(config.prompt_pool.clone()), config.discovery_delay)
    }

    /// Current status.
    pub fn status(&self) -> DiscoveryStatus {
        self.status
    }

    /// Token of the live scan, if any.
    pub fn active_token(&self) -> Option<ActivationToken> {
        self.active_token
    }

    /// Peers currently visible. Empty unless [`DiscoveryStatus::Found`].
    pub fn nearby(&self) -> &[PeerProfile] {
        &self.nearby
    }

    /// Number of visible peers.
    pub fn nearby_count(&self) -> usize {
        self.nearby.len()
    }

    /// Look up a visible peer.
    pub fn peer(&self, id: PeerId) -> Option<&PeerProfile> {
        self.nearby.iter().find(|peer| peer.id == id)
    }

    /// Conversation starter for the current activation.
    pub fn current_prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Turn the beacon on.
    ///
    /// Mints a new activation token, picks a fresh prompt and returns the
    /// timer to schedule.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless dormant.
    pub fn activate(&mut self, rng: &mut dyn RngCore) -> Result<Vec<DiscoveryAction>, EngineError> {
        if self.status != DiscoveryStatus::Dormant {
            return Err(EngineError::invalid_state(self.status, "activate"));
        }

        let token = self.last_token.next();
        self.last_token = token;
        self.active_token = Some(token);
        self.status = DiscoveryStatus::Scanning;
        self.prompt = Some(self.prompts.generate(rng));

        info!(%token, delay = ?self.discovery_delay, "beacon illuminated");

        Ok(vec![DiscoveryAction::ScheduleDiscovery { token, delay: self.discovery_delay }])
    }

    /// Handle the discovery timer.
    ///
    /// A timer whose token is not the live scan's, or that arrives after a
    /// peer was already found, is stale and yields no actions.
    pub fn on_timer_fired(
        &mut self,
        token: ActivationToken,
        factory: &mut dyn PeerFactory,
        rng: &mut dyn RngCore,
    ) -> Vec<DiscoveryAction> {
        if self.active_token != Some(token) || self.status != DiscoveryStatus::Scanning {
            debug!(%token, status = %self.status, "discarding stale discovery timer");
            return Vec::new();
        }

        let id = PeerId(rng.next_u64());
        let profile = factory.create(id, rng);
        info!(peer = %id, pseudonym = %profile.pseudonym, "spark found");

        self.nearby.push(profile);
        self.status = DiscoveryStatus::Found;

        vec![DiscoveryAction::PeerFound { peer: id }]
    }

    /// Turn the beacon off.
    ///
    /// Invalidates the live token, forgets discovered peers and the prompt,
    /// and asks the caller to tear down any open chat.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` if already dormant.
    pub fn deactivate(&mut self) -> Result<Vec<DiscoveryAction>, EngineError> {
        if self.status == DiscoveryStatus::Dormant {
            return Err(EngineError::invalid_state(self.status, "deactivate"));
        }

        info!(from = %self.status, "beacon going stealth");

        self.status = DiscoveryStatus::Dormant;
        self.active_token = None;
        self.nearby.clear();
        self.prompt = None;

        Ok(vec![DiscoveryAction::TeardownChat])
    }
}
