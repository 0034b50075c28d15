//! Observable application state.
//!
//! [`StateChange`] is the diff pushed to subscribers as it happens;
//! [`Snapshot`] is the full view a renderer can draw from at any time.

use sparklink_core::{ChatId, ChatMessage, DiscoveryStatus, PeerProfile};

/// Notification published to subscribers after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// Beacon status changed.
    Status(DiscoveryStatus),

    /// Number of visible peers changed.
    NearbyCount(usize),

    /// Conversation starter changed; `None` when the beacon goes dormant.
    Prompt(Option<String>),

    /// A chat was opened.
    ChatOpened {
        /// New chat.
        chat: ChatId,
        /// Peer being chatted with.
        peer: PeerProfile,
    },

    /// A message was appended to the open chat.
    MessageAppended {
        /// Chat the message belongs to.
        chat: ChatId,
        /// The appended message.
        message: ChatMessage,
    },

    /// The open chat was closed and its log discarded.
    ChatClosed {
        /// Closed chat.
        chat: ChatId,
    },
}

/// Read-only view of an open chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    /// Chat identifier.
    pub id: ChatId,
    /// Peer being chatted with.
    pub peer: PeerProfile,
    /// Messages in append order.
    pub messages: Vec<ChatMessage>,
}

/// Full application state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Beacon status.
    pub status: DiscoveryStatus,
    /// Visible peers.
    pub nearby: Vec<PeerProfile>,
    /// Conversation starter for the current activation.
    pub prompt: Option<String>,
    /// Open chat, if any.
    pub chat: Option<ChatView>,
}

impl Snapshot {
    /// Number of visible peers.
    pub fn nearby_count(&self) -> usize {
        self.nearby.len()
    }
}
