//! Events consumed by the App state machine.

use sparklink_core::{PeerId, Timer};

/// Inbound events: user intents from the presentation layer and timer
/// firings from the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Turn the beacon on.
    ActivateBeacon,

    /// Turn the beacon off.
    DeactivateBeacon,

    /// Flip the beacon: activate when dormant, deactivate otherwise.
    ToggleBeacon,

    /// Open a chat with a discovered peer.
    OpenChat {
        /// Peer to chat with.
        peer_id: PeerId,
    },

    /// Send a message in the open chat.
    SendMessage {
        /// Message text.
        text: String,
    },

    /// Close the open chat.
    CloseChat,

    /// A previously scheduled timer is due.
    TimerFired(Timer),

    /// Quit the application.
    Quit,
}
