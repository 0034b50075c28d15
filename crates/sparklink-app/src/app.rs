//! Application-session root.
//!
//! [`App`] owns the single [`DiscoverySession`] and at most one
//! [`ChatSession`]. It is the only place either is mutated. Each inbound
//! [`AppEvent`] returns the [`AppAction`]s a runtime must execute, and every
//! state change is pushed to subscribers as a [`StateChange`].
//!
//! The model is single-queue: events and timer firings are handled one at a
//! time on the caller's task, so no locking is involved.

use std::fmt;

use sparklink_core::{
    CatalogPeerFactory, ChatId, ChatSession, DiscoveryAction, DiscoverySession, DiscoveryStatus,
    EngineConfig, EngineError, EnvRng, Environment, FixedPeerFactory, PeerFactory, PeerId,
    PeerSelection, ReplyToken, Timer, ValidationError,
};
use tracing::{debug, info};

use crate::{AppAction, AppError, AppEvent, ChatView, Snapshot, StateChange};

type Observer = Box<dyn FnMut(&StateChange) + Send>;

/// Handle returned by [`App::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Application state machine.
pub struct App<E: Environment> {
    env: E,
    config: EngineConfig,
    discovery: DiscoverySession,
    chat: Option<ChatSession>,
    last_chat: u64,
    peers: Box<dyn PeerFactory>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<E: Environment> fmt::Debug for App<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("discovery", &self.discovery)
            .field("chat", &self.chat)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<E: Environment> App<E> {
    /// Create an app whose peer factory follows `config.peer_selection`.
    pub fn new(env: E, config: EngineConfig) -> Result<Self, AppError> {
        let peers: Box<dyn PeerFactory> = match config.peer_selection {
            PeerSelection::Fixed => Box::new(FixedPeerFactory::default()),
            PeerSelection::Catalog => Box::new(CatalogPeerFactory::builtin()),
        };
        Self::build(env, config, peers)
    }

    /// Create an app with the default configuration.
    ///
    /// Infallible: the defaults always validate.
    pub fn with_defaults(env: E) -> Self {
        Self::assemble(env, EngineConfig::default(), Box::new(FixedPeerFactory::default()))
    }

    /// Create an app with a caller-supplied peer factory.
    ///
    /// `config.peer_selection` is ignored.
    pub fn with_peer_factory(
        env: E,
        config: EngineConfig,
        peers: impl PeerFactory + 'static,
    ) -> Result<Self, AppError> {
        Self::build(env, config, Box::new(peers))
    }

    fn build(env: E, config: EngineConfig, peers: Box<dyn PeerFactory>) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self::assemble(env, config, peers))
    }

    fn assemble(env: E, config: EngineConfig, peers: Box<dyn PeerFactory>) -> Self {
        Self {
            env,
            discovery: DiscoverySession::from_config(&config),
            config,
            chat: None,
            last_chat: 0,
            peers,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Environment the app reads time and randomness from.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Beacon status.
    pub fn status(&self) -> DiscoveryStatus {
        self.discovery.status()
    }

    /// Discovery session (read-only).
    pub fn discovery(&self) -> &DiscoverySession {
        &self.discovery
    }

    /// Open chat, if any (read-only).
    pub fn chat(&self) -> Option<&ChatSession> {
        self.chat.as_ref()
    }

    /// Register an observer for state changes.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&StateChange) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Full view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.discovery.status(),
            nearby: self.discovery.nearby().to_vec(),
            prompt: self.discovery.current_prompt().map(str::to_string),
            chat: self.chat.as_ref().map(|chat| ChatView {
                id: chat.id(),
                peer: chat.peer().clone(),
                messages: chat.messages().to_vec(),
            }),
        }
    }

    /// Process an event.
    ///
    /// Timer events never fail; stale timers yield no actions.
    pub fn handle(&mut self, event: AppEvent) -> Result<Vec<AppAction>, AppError> {
        match event {
            AppEvent::ActivateBeacon => self.activate_beacon(),
            AppEvent::DeactivateBeacon => self.deactivate_beacon(),
            AppEvent::ToggleBeacon => self.toggle_beacon(),
            AppEvent::OpenChat { peer_id } => self.open_chat(peer_id),
            AppEvent::SendMessage { text } => self.send_message(&text),
            AppEvent::CloseChat => self.close_chat(),
            AppEvent::TimerFired(timer) => Ok(self.timer_fired(timer)),
            AppEvent::Quit => Ok(vec![AppAction::Quit]),
        }
    }

    /// Turn the beacon on.
    pub fn activate_beacon(&mut self) -> Result<Vec<AppAction>, AppError> {
        let mut rng = EnvRng::new(&self.env);
        let actions = self.discovery.activate(&mut rng)?;

        self.publish(StateChange::Status(self.discovery.status()));
        self.publish(StateChange::Prompt(self.discovery.current_prompt().map(str::to_string)));

        Ok(self.apply_discovery(actions))
    }

    /// Turn the beacon off, tearing down any open chat.
    pub fn deactivate_beacon(&mut self) -> Result<Vec<AppAction>, AppError> {
        let had_peers = self.discovery.nearby_count() > 0;
        let actions = self.discovery.deactivate()?;

        // Chat goes first so observers never see a chat outliving its peer
        let actions = self.apply_discovery(actions);

        self.publish(StateChange::Status(self.discovery.status()));
        if had_peers {
            self.publish(StateChange::NearbyCount(0));
        }
        self.publish(StateChange::Prompt(None));

        Ok(actions)
    }

    /// Activate when dormant, deactivate otherwise.
    pub fn toggle_beacon(&mut self) -> Result<Vec<AppAction>, AppError> {
        if self.discovery.status().is_active() {
            self.deactivate_beacon()
        } else {
            self.activate_beacon()
        }
    }

    /// Open a chat with a peer exposed by the current discovery.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless a peer is found and no chat is open.
    /// - `Validation(UnknownPeer)` if `peer_id` is not currently visible.
    pub fn open_chat(&mut self, peer_id: PeerId) -> Result<Vec<AppAction>, AppError> {
        let status = self.discovery.status();
        if status != DiscoveryStatus::Found {
            return Err(invalid_state(status, "open chat"));
        }
        if let Some(chat) = &self.chat {
            return Err(invalid_state(format!("{} is open", chat.id()), "open chat"));
        }
        let peer = self
            .discovery
            .peer(peer_id)
            .cloned()
            .ok_or_else(|| EngineError::from(ValidationError::UnknownPeer(peer_id)))?;

        self.last_chat += 1;
        let id = ChatId(self.last_chat);
        self.chat = Some(ChatSession::with_config(id, peer.clone(), &self.config));
        self.publish(StateChange::ChatOpened { chat: id, peer });

        Ok(vec![AppAction::Render])
    }

    /// Send a message in the open chat and schedule the auto-reply.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if no chat is open.
    /// - `Validation(EmptyMessage)` for blank text.
    pub fn send_message(&mut self, text: &str) -> Result<Vec<AppAction>, AppError> {
        let now = self.env.now();
        let Some(chat) = self.chat.as_mut() else {
            return Err(invalid_state("no chat is open", "send message"));
        };

        let (message, token) = chat.send(text, now)?;
        let delay = chat.reply_delay();
        let id = chat.id();
        self.publish(StateChange::MessageAppended { chat: id, message });

        Ok(vec![AppAction::ScheduleTimer { delay, timer: Timer::Reply(token) }, AppAction::Render])
    }

    /// Close the open chat, discarding its log.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` if no chat is open.
    pub fn close_chat(&mut self) -> Result<Vec<AppAction>, AppError> {
        if self.teardown_chat() {
            Ok(vec![AppAction::Render])
        } else {
            Err(invalid_state("no chat is open", "close chat"))
        }
    }

    fn timer_fired(&mut self, timer: Timer) -> Vec<AppAction> {
        match timer {
            Timer::Discovery(token) => {
                let mut rng = EnvRng::new(&self.env);
                let actions = self.discovery.on_timer_fired(token, self.peers.as_mut(), &mut rng);
                self.apply_discovery(actions)
            },
            Timer::Reply(token) => self.reply_fired(token),
        }
    }

    fn reply_fired(&mut self, token: ReplyToken) -> Vec<AppAction> {
        let now = self.env.now();
        let appended = match self.chat.as_mut() {
            Some(chat) if chat.id() == token.chat => chat.on_reply_fired(token, now),
            _ => {
                debug!(%token, "discarding reply for a chat that is gone");
                None
            },
        };

        match appended {
            Some(message) => {
                self.publish(StateChange::MessageAppended { chat: token.chat, message });
                vec![AppAction::Render]
            },
            None => Vec::new(),
        }
    }

    fn apply_discovery(&mut self, actions: Vec<DiscoveryAction>) -> Vec<AppAction> {
        let changed = !actions.is_empty();
        let mut out = Vec::with_capacity(actions.len() + 1);
        for action in actions {
            match action {
                DiscoveryAction::ScheduleDiscovery { token, delay } => {
                    out.push(AppAction::ScheduleTimer { delay, timer: Timer::Discovery(token) });
                },
                DiscoveryAction::PeerFound { peer } => {
                    debug!(%peer, "exposing discovered peer");
                    self.publish(StateChange::Status(self.discovery.status()));
                    self.publish(StateChange::NearbyCount(self.discovery.nearby_count()));
                },
                DiscoveryAction::TeardownChat => {
                    self.teardown_chat();
                },
            }
        }
        if changed {
            out.push(AppAction::Render);
        }
        out
    }

    /// Close and drop the open chat. Returns whether there was one.
    fn teardown_chat(&mut self) -> bool {
        let Some(mut chat) = self.chat.take() else {
            return false;
        };
        chat.close();
        info!(chat = %chat.id(), "chat torn down");
        self.publish(StateChange::ChatClosed { chat: chat.id() });
        true
    }

    fn publish(&mut self, change: StateChange) {
        for (_, observer) in &mut self.observers {
            observer(&change);
        }
    }
}

fn invalid_state(state: impl ToString, operation: &str) -> AppError {
    EngineError::InvalidStateTransition {
        state: state.to_string(),
        operation: operation.to_string(),
    }
    .into()
}
