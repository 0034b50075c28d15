//! Plain-text rendering of application state.

use sparklink_app::{AppError, Snapshot};

/// Render the full state as lines of text.
pub fn render(snapshot: &Snapshot) -> String {
    let mut lines = vec![format!("[{}]", snapshot.status.label())];

    if let Some(prompt) = &snapshot.prompt {
        lines.push(format!("  prompt: {prompt}"));
    }

    for peer in &snapshot.nearby {
        lines.push(format!(
            "  nearby: {} {} ({}, {}) [{}]",
            peer.id,
            peer.pseudonym,
            peer.year,
            peer.major,
            peer.help_tags.join(", ")
        ));
    }

    if let Some(chat) = &snapshot.chat {
        lines.push(format!("  chat with {}:", chat.peer.pseudonym));
        for message in &chat.messages {
            let author = if message.is_mine() { "you" } else { chat.peer.pseudonym.as_str() };
            lines.push(format!("    {author}: {}", message.text));
        }
    }

    lines.join("\n")
}

/// Render a rejected intent.
pub fn render_error(error: &AppError) -> String {
    format!("! {error}")
}
