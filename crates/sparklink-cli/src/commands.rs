//! Command parsing for the line-based shell.
//!
//! This module parses input lines into structured [`Command`] values.

use sparklink_core::PeerId;

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Turn the beacon on.
    On,

    /// Turn the beacon off.
    Off,

    /// Flip the beacon.
    Toggle,

    /// Open a chat.
    Open {
        /// Peer to chat with; the first visible peer when omitted.
        peer: Option<PeerId>,
    },

    /// Close the open chat.
    Close,

    /// Print the full state again.
    Status,

    /// Print the command list.
    Help,

    /// Quit the application.
    Quit,

    /// Send a message in the open chat.
    Message {
        /// Message text.
        text: String,
    },

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Command summary printed by `/help`.
pub const HELP: &str = "\
/on            turn the beacon on
/off           turn the beacon off
/toggle        flip the beacon
/open [peer]   chat with a discovered peer
/close         close the chat
/status        show the current state
/quit          exit
anything else  send it as a message";

/// Parse a user input line into a command.
///
/// Commands start with `/`. Anything else is treated as a message, including
/// blank lines, which the engine then rejects.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Command::Message { text: input.to_string() };
    };

    let parts: Vec<&str> = cmd_str.split_whitespace().collect();
    let command = parts.first().copied().unwrap_or("");

    match command {
        "on" => Command::On,
        "off" => Command::Off,
        "toggle" | "t" => Command::Toggle,

        "open" => match parts.get(1) {
            Some(id_str) => match u64::from_str_radix(id_str, 16) {
                Ok(id) => Command::Open { peer: Some(PeerId(id)) },
                Err(_) => {
                    Command::InvalidArgs { command: "open".into(), error: "Invalid peer ID".into() }
                },
            },
            None => Command::Open { peer: None },
        },

        "close" => Command::Close,
        "status" | "s" => Command::Status,
        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    }
}
