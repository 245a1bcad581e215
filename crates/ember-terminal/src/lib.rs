//! Headless terminal emulator core: VT parsing, PTY management, packed
//! cell snapshots.
//!
//! This crate wraps `alacritty_terminal` and `portable-pty` into a
//! self-contained emulator that can be driven from any host runtime. Bytes
//! go in (from a PTY child or directly in test mode), and consistent,
//! binary-packed copies of the cell grid and scrollback come out, ready to
//! hand across a language bridge as flat buffers.

pub mod cell;
pub mod colors;
pub mod error;
pub mod event;
pub mod grid;
pub mod pty;
pub mod terminal;
pub mod vt;

// Re-export primary types at crate root for convenience.
pub use cell::{
    Cell, GridSnapshot, ScrollbackLine, ScrollbackSnapshot, CELL_BYTES, FLAG_BLINK, FLAG_BOLD,
    FLAG_ITALIC, FLAG_REVERSE, FLAG_STRIKE, FLAG_UNDERLINE, WIDTH_MASK, WIDTH_SHIFT,
};
pub use error::TerminalError;
pub use event::{EmberEventListener, TerminalEvent};
pub use grid::{CellGrid, DEFAULT_SCROLLBACK_LINES};
pub use pty::{detect_shell, PtySession};
pub use terminal::EmberTerminal;
pub use vt::{EmuState, TermDimensions, VtAdapter};

// Re-export the parser types that appear at this crate's seams so
// embedders don't need a direct alacritty_terminal dependency.
pub use alacritty_terminal::sync::FairMutex;
pub use alacritty_terminal::term::color::Colors;
pub use alacritty_terminal::vte::ansi::{Color, NamedColor, Rgb};
