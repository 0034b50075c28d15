//! Reference model of the engine.
//!
//! A deliberately naive re-statement of the discovery and chat rules over
//! integer milliseconds. It keeps at most one pending deadline of each kind
//! and simply forgets superseded ones, which is exactly the behaviour the
//! real engine must reproduce with tokens and a non-cancelling timer queue.

use std::time::Duration;

use sparklink_app::AppError;
use sparklink_core::{DiscoveryStatus, EngineConfig, EngineError, Sender, ValidationError};

/// Text sent by a [`Operation::Send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// `""`
    Empty,
    /// Whitespace only.
    Blank,
    /// A short non-blank word, numbered.
    Word(u8),
}

impl TextKind {
    /// Concrete message text.
    pub fn to_text(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Blank => " \t ".to_string(),
            Self::Word(n) => format!("msg-{n}"),
        }
    }
}

/// One step of a generated test sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Turn the beacon on.
    Activate,
    /// Turn the beacon off.
    Deactivate,
    /// Flip the beacon.
    Toggle,
    /// Open a chat with the first visible peer.
    OpenChat,
    /// Send a message in the open chat.
    Send {
        /// What to send.
        text: TextKind,
    },
    /// Close the open chat.
    CloseChat,
    /// Let virtual time pass.
    AdvanceTime {
        /// How far to advance.
        millis: u16,
    },
}

/// Error classes compared between model and engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Operation not allowed in the current state.
    InvalidState,
    /// Blank message text.
    EmptyMessage,
    /// Peer not visible.
    UnknownPeer,
    /// Configuration rejected.
    Config,
}

impl From<&AppError> for OperationError {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Engine(EngineError::InvalidStateTransition { .. }) => Self::InvalidState,
            AppError::Engine(EngineError::Validation(ValidationError::EmptyMessage)) => {
                Self::EmptyMessage
            },
            AppError::Engine(EngineError::Validation(ValidationError::UnknownPeer(_))) => {
                Self::UnknownPeer
            },
            AppError::Config(_) => Self::Config,
        }
    }
}

/// Outcome of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Accepted.
    Ok,
    /// Rejected.
    Error(OperationError),
}

impl OperationResult {
    /// Whether the operation was accepted.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Whether the operation was rejected.
    pub fn is_err(self) -> bool {
        !self.is_ok()
    }
}

impl From<Result<(), AppError>> for OperationResult {
    fn from(result: Result<(), AppError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(error) => Self::Error(OperationError::from(&error)),
        }
    }
}

/// Observable state compared between model and engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelState {
    /// Beacon status.
    pub status: DiscoveryStatus,
    /// Visible peers.
    pub nearby_count: usize,
    /// Whether a prompt is shown.
    pub has_prompt: bool,
    /// Open chat transcript.
    pub chat: Option<Vec<(Sender, String)>>,
}

#[derive(Debug, Clone)]
struct ModelChat {
    messages: Vec<(Sender, String)>,
    reply_due: Option<u64>,
}

/// Reference model.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    now: u64,
    discovery_delay: u64,
    reply_delay: u64,
    canned_reply: String,
    status: DiscoveryStatus,
    discovery_due: Option<u64>,
    chat: Option<ModelChat>,
}

impl ModelWorld {
    /// Model of an engine built from `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            now: 0,
            discovery_delay: millis(config.discovery_delay),
            reply_delay: millis(config.reply_delay),
            canned_reply: config.canned_reply.clone(),
            status: DiscoveryStatus::Dormant,
            discovery_due: None,
            chat: None,
        }
    }

    /// Milliseconds of model time elapsed.
    pub fn now_millis(&self) -> u64 {
        self.now
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Activate => self.activate(),
            Operation::Deactivate => self.deactivate(),
            Operation::Toggle => {
                if self.status == DiscoveryStatus::Dormant {
                    self.activate()
                } else {
                    self.deactivate()
                }
            },
            Operation::OpenChat => self.open_chat(),
            Operation::Send { text } => self.send(&text.to_text()),
            Operation::CloseChat => self.close_chat(),
            Operation::AdvanceTime { millis } => {
                self.advance(u64::from(*millis));
                OperationResult::Ok
            },
        }
    }

    /// Current observable state.
    pub fn observable_state(&self) -> ModelState {
        ModelState {
            status: self.status,
            nearby_count: usize::from(self.status == DiscoveryStatus::Found),
            has_prompt: self.status != DiscoveryStatus::Dormant,
            chat: self.chat.as_ref().map(|chat| chat.messages.clone()),
        }
    }

    fn activate(&mut self) -> OperationResult {
        if self.status != DiscoveryStatus::Dormant {
            return OperationResult::Error(OperationError::InvalidState);
        }
        self.status = DiscoveryStatus::Scanning;
        self.discovery_due = Some(self.now + self.discovery_delay);
        OperationResult::Ok
    }

    fn deactivate(&mut self) -> OperationResult {
        if self.status == DiscoveryStatus::Dormant {
            return OperationResult::Error(OperationError::InvalidState);
        }
        self.status = DiscoveryStatus::Dormant;
        self.discovery_due = None;
        self.chat = None;
        OperationResult::Ok
    }

    fn open_chat(&mut self) -> OperationResult {
        if self.status != DiscoveryStatus::Found || self.chat.is_some() {
            return OperationResult::Error(OperationError::InvalidState);
        }
        self.chat = Some(ModelChat { messages: Vec::new(), reply_due: None });
        OperationResult::Ok
    }

    fn send(&mut self, text: &str) -> OperationResult {
        let now = self.now;
        let reply_delay = self.reply_delay;
        let Some(chat) = self.chat.as_mut() else {
            return OperationResult::Error(OperationError::InvalidState);
        };
        if text.trim().is_empty() {
            return OperationResult::Error(OperationError::EmptyMessage);
        }
        chat.messages.push((Sender::User, text.to_string()));
        chat.reply_due = Some(now + reply_delay);
        OperationResult::Ok
    }

    fn close_chat(&mut self) -> OperationResult {
        if self.chat.take().is_none() {
            return OperationResult::Error(OperationError::InvalidState);
        }
        OperationResult::Ok
    }

    fn advance(&mut self, millis: u64) {
        let target = self.now + millis;

        // A chat only exists once a peer is found, so at most one of the two
        // deadlines is ever pending.
        if let Some(due) = self.discovery_due.filter(|due| *due <= target) {
            self.now = due;
            self.discovery_due = None;
            self.status = DiscoveryStatus::Found;
        }
        if let Some(chat) = self.chat.as_mut() {
            if let Some(due) = chat.reply_due.filter(|due| *due <= target) {
                self.now = due;
                chat.reply_due = None;
                chat.messages.push((Sender::Peer, self.canned_reply.clone()));
            }
        }

        self.now = target;
    }
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
