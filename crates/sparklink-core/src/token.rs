//! Tokens that tie delayed callbacks to the state that scheduled them.
//!
//! A timer is only honoured if the token it carries still matches the live
//! state. Minting a new token (or discarding the state) makes every earlier
//! timer stale without touching the timer source.

use std::fmt;

/// Identifies one scanning cycle of the discovery session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivationToken(u64);

impl ActivationToken {
    /// Token following `self`.
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Token that precedes every minted token.
    pub(crate) const fn zero() -> Self {
        Self(0)
    }
}

impl fmt::Display for ActivationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "activation#{}", self.0)
    }
}

/// Identifies one opened chat session.
///
/// Minted by the application root, which outlives every chat, so a reply
/// scheduled by a closed chat never matches a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub u64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat#{}", self.0)
    }
}

/// Identifies one scheduled auto-reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyToken {
    /// Chat that scheduled the reply.
    pub chat: ChatId,
    /// Per-chat sequence number, one per accepted send.
    pub seq: u64,
}

impl fmt::Display for ReplyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/reply#{}", self.chat, self.seq)
    }
}

/// Payload of a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Discovery delay elapsed for the given scanning cycle.
    Discovery(ActivationToken),
    /// Auto-reply delay elapsed for the given send.
    Reply(ReplyToken),
}
