//! Anonymous chat session.
//!
//! Holds the ordered message log for one discovered peer and the scripted
//! auto-reply. The log is append-only: insertion order is display order and
//! no message is ever edited or removed.
//!
//! # Auto-reply
//!
//! Each accepted send schedules one reply and supersedes any reply still in
//! flight. Only the reply belonging to the most recent send is ever
//! appended, so with N sends before any reply fires the log ends with N user
//! messages followed by exactly one peer message.

use std::{
    fmt,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    error::{EngineError, ValidationError},
    peer::PeerProfile,
    token::{ChatId, ReplyToken},
};

/// Reply text used when none is configured.
pub const DEFAULT_CANNED_REPLY: &str = "Hey! I'm nearby. I'd love to chat!";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The local user.
    User,
    /// The discovered peer.
    Peer,
}

/// Per-chat message sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg#{}", self.0)
    }
}

/// An immutable chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Unique within its chat; increases with append order.
    pub id: MessageId,
    /// Message body.
    pub text: String,
    /// Author.
    pub sender: Sender,
    /// When the message was appended. Never earlier than its predecessor.
    pub timestamp: Instant,
}

impl ChatMessage {
    /// Whether the local user wrote this message.
    pub fn is_mine(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Chat with one discovered peer.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: ChatId,
    peer: PeerProfile,
    messages: Vec<ChatMessage>,
    pending_reply: Option<ReplyToken>,
    next_reply_seq: u64,
    closed: bool,
    reply_delay: Duration,
    canned_reply: String,
}

impl ChatSession {
    /// Open an empty chat with `peer`.
    ///
    /// The caller guarantees `peer` came from the current discovery.
    pub fn open(
        id: ChatId,
        peer: PeerProfile,
        reply_delay: Duration,
        canned_reply: String,
    ) -> Self {
        info!(chat = %id, peer = %peer.id, "chat opened");
        Self {
            id,
            peer,
            messages: Vec::new(),
            pending_reply: None,
            next_reply_seq: 0,
            closed: false,
            reply_delay,
            canned_reply,
        }
    }

    /// Open an empty chat using the configured reply behaviour.
    pub fn with_config(id: ChatId, peer: PeerProfile, config: &EngineConfig) -> Self {
        Self::open(id, peer, config.reply_delay, config.canned_reply.clone())
    }

    /// Chat identifier.
    pub fn id(&self) -> ChatId {
        self.id
    }

    /// Peer being chatted with.
    pub fn peer(&self) -> &PeerProfile {
        &self.peer
    }

    /// Messages in append order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Token of the reply in flight, if any.
    pub fn pending_reply(&self) -> Option<ReplyToken> {
        self.pending_reply
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Append a user message and schedule the auto-reply.
    ///
    /// Returns the appended message and the reply token to schedule after
    /// [`reply_delay`](Self::reply_delay). The new token supersedes any
    /// reply still pending.
    ///
    /// # Errors
    ///
    /// - `Validation(EmptyMessage)` for empty or whitespace-only text; the
    ///   log and the pending reply are untouched.
    /// - `InvalidStateTransition` after [`close`](Self::close).
    pub fn send(
        &mut self,
        text: &str,
        now: Instant,
    ) -> Result<(ChatMessage, ReplyToken), EngineError> {
        if self.closed {
            return Err(EngineError::invalid_state("chat closed", "send"));
        }
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }

        let message = self.append(text.to_string(), Sender::User, now);

        let token = ReplyToken { chat: self.id, seq: self.next_reply_seq };
        self.next_reply_seq += 1;
        if let Some(superseded) = self.pending_reply.replace(token) {
            debug!(%superseded, %token, "pending reply superseded");
        }

        Ok((message, token))
    }

    /// Deliver the auto-reply for `token`.
    ///
    /// Returns the appended peer message, or `None` if the token is stale or
    /// the chat is closed.
    pub fn on_reply_fired(&mut self, token: ReplyToken, now: Instant) -> Option<ChatMessage> {
        if self.closed || self.pending_reply != Some(token) {
            debug!(%token, closed = self.closed, "discarding stale reply");
            return None;
        }

        self.pending_reply = None;
        Some(self.append(self.canned_reply.clone(), Sender::Peer, now))
    }

    /// Close the chat.
    ///
    /// Drops the pending reply and discards the log. Later replies are
    /// no-ops.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        info!(chat = %self.id, messages = self.messages.len(), "chat closed");
        self.closed = true;
        self.pending_reply = None;
        self.messages.clear();
    }

    /// Delay between a send and its reply.
    pub fn reply_delay(&self) -> Duration {
        self.reply_delay
    }

    fn append(&mut self, text: String, sender: Sender, now: Instant) -> ChatMessage {
        // Clamp so timestamps never run backwards relative to append order.
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        let message =
            ChatMessage { id: MessageId(self.messages.len() as u64), text, sender, timestamp };
        self.messages.push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::{PeerId, ProfileTemplate};

    #[allow(clippy::disallowed_methods)]
    fn t0() -> Instant {
        Instant::now()
    }

    fn chat() -> ChatSession {
        let peer = ProfileTemplate::default().instantiate(PeerId(1));
        ChatSession::open(ChatId(1), peer, Duration::from_millis(1500), DEFAULT_CANNED_REPLY.into())
    }

    fn transcript(chat: &ChatSession) -> Vec<(Sender, &str)> {
        chat.messages().iter().map(|m| (m.sender, m.text.as_str())).collect()
    }

    #[test]
    fn send_then_reply() {
        let t0 = t0();
        let mut chat = chat();

        let (message, token) = chat.send("hi", t0).unwrap();
        assert_eq!(message.text, "hi");
        assert_eq!(message.sender, Sender::User);
        assert!(message.is_mine());
        assert_eq!(chat.pending_reply(), Some(token));

        let reply = chat.on_reply_fired(token, t0 + chat.reply_delay()).unwrap();
        assert_eq!(reply.sender, Sender::Peer);
        assert_eq!(reply.text, DEFAULT_CANNED_REPLY);
        assert_eq!(chat.pending_reply(), None);
        assert_eq!(
            transcript(&chat),
            vec![(Sender::User, "hi"), (Sender::Peer, DEFAULT_CANNED_REPLY)]
        );
    }

    #[test]
    fn blank_messages_rejected() {
        let t0 = t0();
        let mut chat = chat();

        for text in ["", "   ", "\t\n"] {
            let result = chat.send(text, t0);
            assert_eq!(result, Err(EngineError::Validation(ValidationError::EmptyMessage)));
        }
        assert!(chat.messages().is_empty());
        assert_eq!(chat.pending_reply(), None);
    }

    #[test]
    fn later_send_supersedes_pending_reply() {
        let t0 = t0();
        let mut chat = chat();

        let (_, first) = chat.send("hi", t0).unwrap();
        let (_, second) = chat.send("there", t0 + Duration::from_millis(500)).unwrap();
        assert_ne!(first, second);

        // Original reply would have fired at t=1.5
        assert!(chat.on_reply_fired(first, t0 + Duration::from_millis(1500)).is_none());
        assert!(chat.on_reply_fired(second, t0 + Duration::from_millis(2000)).is_some());

        assert_eq!(
            transcript(&chat),
            vec![
                (Sender::User, "hi"),
                (Sender::User, "there"),
                (Sender::Peer, DEFAULT_CANNED_REPLY),
            ]
        );
    }

    #[test]
    fn reply_fires_at_most_once() {
        let t0 = t0();
        let mut chat = chat();

        let (_, token) = chat.send("hi", t0).unwrap();
        assert!(chat.on_reply_fired(token, t0).is_some());
        assert!(chat.on_reply_fired(token, t0).is_none());
        assert_eq!(chat.messages().len(), 2);
    }

    #[test]
    fn close_discards_log_and_pending_reply() {
        let t0 = t0();
        let mut chat = chat();

        let (_, token) = chat.send("hi", t0).unwrap();
        chat.close();

        assert!(chat.is_closed());
        assert!(chat.messages().is_empty());
        assert!(chat.on_reply_fired(token, t0 + Duration::from_secs(2)).is_none());
        assert!(chat.messages().is_empty());

        assert!(matches!(
            chat.send("again", t0),
            Err(EngineError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn ids_and_timestamps_follow_append_order() {
        let t0 = t0();
        let mut chat = chat();

        chat.send("one", t0 + Duration::from_secs(5)).unwrap();
        // Clock reading earlier than the previous message is clamped
        chat.send("two", t0).unwrap();
        let (_, token) = chat.send("three", t0 + Duration::from_secs(6)).unwrap();
        chat.on_reply_fired(token, t0 + Duration::from_secs(8));

        let messages = chat.messages();
        for pair in messages.windows(2) {
            assert!(pair[0].id < pair[1].id);
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(messages[1].timestamp, t0 + Duration::from_secs(5));
    }

    #[test]
    fn surrounding_whitespace_is_kept() {
        let mut chat = chat();
        let (message, _) = chat.send("  hello  ", t0()).unwrap();
        assert_eq!(message.text, "  hello  ");
    }
}
