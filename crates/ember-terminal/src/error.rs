//! Error types for the terminal core.

/// Errors surfaced by the terminal facade.
///
/// Child exit is not an error: the reader observes EOF and the session
/// winds down on the next `stop_pty`. Malformed control sequences are
/// discarded inside the parser and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    /// Rows or cols were zero at construction or resize.
    #[error("rows and cols must be strictly positive: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    /// `start_pty` was called while a session is already up.
    #[error("a PTY session is already running")]
    PtyAlreadyRunning,

    /// Opening the pseudoterminal or spawning the shell failed. No session
    /// state is retained.
    #[error("failed to start PTY session: {0}")]
    PtyStartFailed(#[source] anyhow::Error),

    /// Read/write error on the PTY master. Short writes are not errors;
    /// they return the partial count to the caller.
    #[error("PTY I/O error: {0}")]
    PtyIo(#[from] std::io::Error),
}
