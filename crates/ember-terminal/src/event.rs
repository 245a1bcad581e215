//! Channel bridge for parser-emitted terminal events.

use std::sync::mpsc;

use alacritty_terminal::event::{Event as AlacEvent, EventListener};

/// Events produced by the emulator for the embedding layer.
///
/// The core itself never pushes notifications; embedders drain these when
/// they poll. `PtyWrite` carries parser-generated replies (DSR, DA) that
/// the embedder forwards via `write_input`.
#[derive(Debug, Clone)]
pub enum TerminalEvent {
    /// Terminal content changed since the last batch.
    Wakeup,
    /// Window title changed (OSC 0/2).
    Title(String),
    /// Bell character received.
    Bell,
    /// The parser wants bytes written back to the PTY.
    PtyWrite(String),
    /// Child process exited.
    ProcessExit(i32),
}

/// Adapts the parser's event callback onto an mpsc channel.
pub struct EmberEventListener {
    sender: mpsc::Sender<TerminalEvent>,
}

impl EmberEventListener {
    pub fn new(sender: mpsc::Sender<TerminalEvent>) -> Self {
        Self { sender }
    }
}

impl EventListener for EmberEventListener {
    fn send_event(&self, event: AlacEvent) {
        let mapped = match event {
            AlacEvent::Wakeup => Some(TerminalEvent::Wakeup),
            AlacEvent::Title(title) => Some(TerminalEvent::Title(title)),
            AlacEvent::Bell => Some(TerminalEvent::Bell),
            AlacEvent::PtyWrite(text) => Some(TerminalEvent::PtyWrite(text)),
            AlacEvent::ChildExit(code) => Some(TerminalEvent::ProcessExit(code)),
            // ClipboardStore/Load, ColorRequest, ResetTitle and the other
            // UI-facing events have no consumer in a headless core.
            _ => None,
        };

        if let Some(event) = mapped {
            let _ = self.sender.send(event);
        }
    }
}
