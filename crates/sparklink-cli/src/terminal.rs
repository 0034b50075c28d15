//! Line-based terminal driver.
//!
//! Reads one command per line and writes rendered state as plain text.
//! Output is only written when the rendered text changes, so repeated render
//! requests do not flood the terminal.

use std::io::{self, Write};

use sparklink_app::{AppError, AppEvent, Driver, Snapshot};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use crate::{
    commands::{self, Command, HELP},
    ui,
};

/// Terminal I/O failure.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Reading input or writing output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// [`Driver`] over a line reader and a text writer.
pub struct TerminalDriver<R, W> {
    lines: Lines<R>,
    out: W,
    last_snapshot: Option<Snapshot>,
    last_frame: Option<String>,
}

impl TerminalDriver<BufReader<Stdin>, io::Stdout> {
    /// Driver on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R, W> TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Driver reading commands from `input` and writing to `out`.
    pub fn new(input: R, out: W) -> Self {
        Self { lines: input.lines(), out, last_snapshot: None, last_frame: None }
    }

    /// Everything written so far, for writers that keep it.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Map a parsed command to an event, or handle it locally.
    fn handle_command(&mut self, command: Command) -> io::Result<Option<AppEvent>> {
        let event = match command {
            Command::On => AppEvent::ActivateBeacon,
            Command::Off => AppEvent::DeactivateBeacon,
            Command::Toggle => AppEvent::ToggleBeacon,
            Command::Open { peer: Some(peer_id) } => AppEvent::OpenChat { peer_id },
            Command::Open { peer: None } => {
                let first = self
                    .last_snapshot
                    .as_ref()
                    .and_then(|snapshot| snapshot.nearby.first())
                    .map(|peer| peer.id);
                match first {
                    Some(peer_id) => AppEvent::OpenChat { peer_id },
                    None => {
                        writeln!(self.out, "! no spark nearby")?;
                        return Ok(None);
                    },
                }
            },
            Command::Close => AppEvent::CloseChat,
            Command::Quit => AppEvent::Quit,
            Command::Message { text } => AppEvent::SendMessage { text },
            Command::Status => {
                if let Some(snapshot) = &self.last_snapshot {
                    writeln!(self.out, "{}", ui::render(snapshot))?;
                }
                return Ok(None);
            },
            Command::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(None);
            },
            Command::Unknown { input } => {
                writeln!(self.out, "! unknown command: {input} (try /help)")?;
                return Ok(None);
            },
            Command::InvalidArgs { command, error } => {
                writeln!(self.out, "! /{command}: {error}")?;
                return Ok(None);
            },
        };
        Ok(Some(event))
    }
}

impl<R, W> Driver for TerminalDriver<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        // `next_line` is cancel-safe, and nothing is awaited after a line is
        // taken, so a timer preempting this future never loses input.
        while let Some(line) = self.lines.next_line().await? {
            let command = commands::parse(&line);
            debug!(?command, "input");
            if let Some(event) = self.handle_command(command)? {
                return Ok(Some(event));
            }
            self.out.flush()?;
        }
        Ok(None)
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        let frame = ui::render(snapshot);
        if self.last_frame.as_deref() != Some(frame.as_str()) {
            writeln!(self.out, "{frame}")?;
            self.out.flush()?;
            self.last_frame = Some(frame);
        }
        self.last_snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn report_error(&mut self, error: &AppError) -> Result<(), Self::Error> {
        writeln!(self.out, "{}", ui::render_error(error))?;
        self.out.flush()?;
        Ok(())
    }
}
