//! The terminal facade: the single outward-facing object.
//!
//! `EmberTerminal` owns the parser, the packed grid, the scrollback deque,
//! and (optionally) a PTY session. Every observation or mutation of
//! emulator state goes through the one grid lock; consumers get owned
//! snapshot copies and never see internal storage.

use std::sync::mpsc;
use std::sync::Arc;

use alacritty_terminal::sync::FairMutex;

use crate::cell::{Cell, GridSnapshot, ScrollbackSnapshot};
use crate::error::TerminalError;
use crate::event::TerminalEvent;
use crate::grid::DEFAULT_SCROLLBACK_LINES;
use crate::pty::{self, PtySession};
use crate::vt::EmuState;

/// A headless terminal: byte stream in, packed cell snapshots out.
///
/// Two threads may drive this concurrently: the embedder (snapshots,
/// input, resize) and the PTY reader. The facade serializes them through
/// the grid lock; the PTY write path stays outside it so input cannot
/// stall snapshotting.
pub struct EmberTerminal {
    state: Arc<FairMutex<EmuState>>,
    session: Option<PtySession>,
    event_rx: mpsc::Receiver<TerminalEvent>,
}

impl EmberTerminal {
    /// Create a terminal with the default scrollback capacity.
    pub fn new(rows: usize, cols: usize) -> Result<Self, TerminalError> {
        Self::with_scrollback(rows, cols, DEFAULT_SCROLLBACK_LINES)
    }

    /// Create a terminal with an explicit scrollback capacity in lines.
    /// Dimensions must be strictly positive.
    pub fn with_scrollback(
        rows: usize,
        cols: usize,
        scrollback_lines: usize,
    ) -> Result<Self, TerminalError> {
        if rows == 0 || cols == 0 {
            return Err(TerminalError::InvalidDimensions { rows, cols });
        }
        let (event_tx, event_rx) = mpsc::channel();
        let state = Arc::new(FairMutex::new(EmuState::new(
            rows,
            cols,
            scrollback_lines,
            event_tx,
        )));
        Ok(Self {
            state,
            session: None,
            event_rx,
        })
    }

    /// Feed bytes to the terminal and return how many were consumed.
    ///
    /// With a live PTY session the bytes go to the child's input; a short
    /// write surfaces as a partial count. Without one (test mode, or after
    /// the child exited) the bytes drive the parser directly under the
    /// grid lock.
    pub fn write_input(&mut self, bytes: &[u8]) -> Result<usize, TerminalError> {
        if let Some(session) = &mut self.session {
            if session.is_running() {
                return session.write(bytes).map_err(TerminalError::PtyIo);
            }
        }
        if bytes.is_empty() {
            return Ok(0);
        }
        let mut state = self.state.lock();
        Ok(state.input(bytes))
    }

    /// Atomic owned copy of the visible grid and cursor.
    pub fn snapshot_grid(&self) -> GridSnapshot {
        let state = self.state.lock();
        let (cursor_x, cursor_y) = state.grid.cursor();
        GridSnapshot {
            rows: state.grid.rows(),
            cols: state.grid.cols(),
            cursor_x,
            cursor_y,
            cells: state.grid.cells().to_vec(),
        }
    }

    /// Take all scrollback lines accumulated since the previous drain,
    /// oldest first. Returns an empty snapshot when nothing is pending.
    pub fn drain_scrollback(&self) -> ScrollbackSnapshot {
        let mut state = self.state.lock();
        let lines = state.grid.drain_scrollback();
        let mut row_lengths = Vec::with_capacity(lines.len());
        let mut cells = Vec::new();
        for line in lines {
            row_lengths.push(line.len() as u32);
            cells.extend_from_slice(&line);
        }
        ScrollbackSnapshot { row_lengths, cells }
    }

    /// Cursor position `(x, y)`, read consistently under the lock.
    pub fn cursor(&self) -> (usize, usize) {
        self.state.lock().grid.cursor()
    }

    /// Current `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.grid.rows(), state.grid.cols())
    }

    /// Resize the terminal. Parser and grid change together under the
    /// lock; the PTY window size follows after the lock is released so the
    /// child's `SIGWINCH`-triggered redraw parses into the new buffer.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<(), TerminalError> {
        if rows == 0 || cols == 0 {
            return Err(TerminalError::InvalidDimensions { rows, cols });
        }
        {
            let mut state = self.state.lock();
            if state.grid.rows() == rows && state.grid.cols() == cols {
                return Ok(());
            }
            state.resize(rows, cols);
        }
        if let Some(session) = &self.session {
            session.resize(rows, cols);
        }
        Ok(())
    }

    /// Start a PTY session running the user's shell (see
    /// [`pty::detect_shell`]).
    pub fn start_pty(&mut self) -> Result<(), TerminalError> {
        self.start_pty_with_shell(&pty::detect_shell())
    }

    /// Start a PTY session running a specific shell binary.
    pub fn start_pty_with_shell(&mut self, shell: &str) -> Result<(), TerminalError> {
        if self.session.is_some() {
            return Err(TerminalError::PtyAlreadyRunning);
        }
        let (rows, cols) = self.dimensions();
        let session = PtySession::start(self.state.clone(), shell, rows, cols)?;
        self.session = Some(session);
        Ok(())
    }

    /// Stop the PTY session: kill and reap the child, join the reader,
    /// close the fds. No-op when no session exists.
    pub fn stop_pty(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }

    /// Whether a session exists and its reader has not yet seen EOF.
    pub fn is_pty_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_running())
    }

    /// PID of the child shell, if a session exists.
    pub fn child_pid(&self) -> Option<u32> {
        self.session.as_ref().and_then(|s| s.child_pid())
    }

    /// Drain parser-emitted events (title, bell, write-back requests,
    /// child exit). Embedders forward `PtyWrite` payloads via
    /// [`write_input`](Self::write_input).
    pub fn drain_events(&mut self) -> Vec<TerminalEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Raw pointer to the live cell buffer.
    ///
    /// Escape hatch for single-threaded test harnesses only: the buffer is
    /// mutated behind this pointer by any later input, invalidated by
    /// `resize`, and must not be read while a PTY reader is running. Use
    /// [`snapshot_grid`](Self::snapshot_grid) everywhere else.
    pub fn raw_cell_buffer(&self) -> *const Cell {
        self.state.lock().grid.as_ptr()
    }
}

impl Drop for EmberTerminal {
    fn drop(&mut self) {
        // Session first: the reader must be gone before the parser and
        // grid go away.
        self.stop_pty();
    }
}
