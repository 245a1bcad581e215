//! VT adapter: wraps the embedded parser and keeps the packed grid in sync.
//!
//! The parser owns the authoritative screen model. After every input batch
//! the adapter replays the parser's damage into the packed cell buffer,
//! captures the cursor, and drains parser-evicted lines into the scrollback
//! deque. All of this runs under the facade's grid lock; the adapter itself
//! is lock-free.

use std::sync::mpsc;

use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::cell::Flags;
use alacritty_terminal::term::color::Colors;
use alacritty_terminal::term::{Config, Term, TermDamage};
use alacritty_terminal::vte::ansi::{self, Processor};

use crate::cell::{
    Cell, ScrollbackLine, FLAG_BOLD, FLAG_ITALIC, FLAG_REVERSE, FLAG_STRIKE, FLAG_UNDERLINE,
    WIDTH_SHIFT,
};
use crate::colors;
use crate::event::{EmberEventListener, TerminalEvent};
use crate::grid::CellGrid;

/// Terminal dimensions handed to the parser.
#[derive(Debug, Clone, Copy)]
pub struct TermDimensions {
    pub rows: usize,
    pub cols: usize,
    pub scrollback_lines: usize,
}

impl Dimensions for TermDimensions {
    fn total_lines(&self) -> usize {
        self.screen_lines() + self.scrollback_lines
    }

    fn screen_lines(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.cols
    }
}

/// Convert one parser cell into the packed wire form.
///
/// Blank cells (the parser's `' '`) encode as `ch == 0`; the background
/// color still carries. Width goes into flags bits 8-15, masked to 8 bits.
fn pack_cell(cell: &alacritty_terminal::term::cell::Cell, palette: &Colors) -> Cell {
    let ch = if cell.c == ' ' { 0 } else { cell.c as u32 };

    let mut flags = 0u32;
    if cell.flags.contains(Flags::BOLD) {
        flags |= FLAG_BOLD;
    }
    if cell.flags.intersects(Flags::ALL_UNDERLINES) {
        flags |= FLAG_UNDERLINE;
    }
    if cell.flags.contains(Flags::ITALIC) {
        flags |= FLAG_ITALIC;
    }
    if cell.flags.contains(Flags::INVERSE) {
        flags |= FLAG_REVERSE;
    }
    if cell.flags.contains(Flags::STRIKEOUT) {
        flags |= FLAG_STRIKE;
    }

    let width: u32 = if cell
        .flags
        .intersects(Flags::WIDE_CHAR_SPACER | Flags::LEADING_WIDE_CHAR_SPACER)
    {
        0
    } else if cell.flags.contains(Flags::WIDE_CHAR) {
        2
    } else {
        1
    };
    flags |= (width & 0xFF) << WIDTH_SHIFT;

    Cell {
        ch,
        fg: colors::resolve(cell.fg, palette),
        bg: colors::resolve(cell.bg, palette),
        flags,
    }
}

/// The embedded parser plus the sync logic that mirrors it into a
/// [`CellGrid`].
pub struct VtAdapter {
    term: Term<EmberEventListener>,
    parser: Processor,
    size: TermDimensions,
}

impl VtAdapter {
    pub fn new(
        rows: usize,
        cols: usize,
        scrollback_lines: usize,
        events: mpsc::Sender<TerminalEvent>,
    ) -> Self {
        let size = TermDimensions {
            rows,
            cols,
            scrollback_lines,
        };
        let config = Config {
            scrolling_history: scrollback_lines,
            ..Config::default()
        };
        let term = Term::new(config, &size, EmberEventListener::new(events));
        Self {
            term,
            parser: ansi::Processor::new(),
            size,
        }
    }

    /// Feed a span of bytes to the parser, then mirror the resulting damage
    /// into `grid`. Returns the number of bytes accepted (the parser always
    /// consumes the whole span). Must be called with the grid lock held.
    pub fn input(&mut self, grid: &mut CellGrid, bytes: &[u8]) -> usize {
        self.parser.advance(&mut self.term, bytes);
        self.sync(grid);
        bytes.len()
    }

    /// Resize parser and grid in one step, parser first so the follow-up
    /// repack already fits the new buffer.
    pub fn resize(&mut self, grid: &mut CellGrid, rows: usize, cols: usize) {
        self.size.rows = rows;
        self.size.cols = cols;
        self.term.resize(self.size);
        grid.reshape(rows, cols);
        self.full_sync(grid);
    }

    /// Mirror parser state into the packed grid, guided by damage tracking.
    fn sync(&mut self, grid: &mut CellGrid) {
        self.drain_history(grid);

        // Collect damage bounds before touching cells: the damage iterator
        // borrows the term mutably.
        let damaged = match self.term.damage() {
            TermDamage::Full => None,
            TermDamage::Partial(iter) => {
                Some(iter.map(|d| (d.line, d.left, d.right)).collect::<Vec<_>>())
            }
        };
        match damaged {
            None => self.repack_all(grid),
            Some(lines) => {
                for (line, left, right) in lines {
                    self.repack_line(grid, line, left, right);
                }
            }
        }
        self.term.reset_damage();

        self.sync_cursor(grid);
    }

    /// Unconditional repack of every visible cell. Used at construction and
    /// after resize, where damage state is not a reliable guide.
    pub fn full_sync(&mut self, grid: &mut CellGrid) {
        self.drain_history(grid);
        self.repack_all(grid);
        self.term.reset_damage();
        self.sync_cursor(grid);
    }

    fn repack_all(&self, grid: &mut CellGrid) {
        for line in 0..self.size.rows {
            self.repack_line(grid, line, 0, self.size.cols - 1);
        }
    }

    /// Repack the inclusive `[left, right]` span of one viewport line.
    fn repack_line(&self, grid: &mut CellGrid, line: usize, left: usize, right: usize) {
        if line >= self.size.rows {
            return;
        }
        let palette = self.term.renderable_content().colors;
        let term_grid = self.term.grid();
        let right = right.min(self.size.cols - 1);
        for col in left..=right {
            let cell = &term_grid[Line(line as i32)][Column(col)];
            grid.put_cell(line, col, pack_cell(cell, palette));
        }
    }

    fn sync_cursor(&self, grid: &mut CellGrid) {
        let point = self.term.grid().cursor.point;
        grid.set_cursor(point.column.0, point.line.0.max(0) as usize);
    }

    /// Move every line the parser scrolled into history since the last
    /// batch onto the scrollback deque, oldest first, then clear the
    /// parser's history so the next batch drains only its own evictions.
    ///
    /// The alternate screen's grid keeps no history, so its evictions never
    /// show up here.
    fn drain_history(&mut self, grid: &mut CellGrid) {
        let history = self.term.grid().history_size();
        if history == 0 {
            return;
        }
        {
            let palette = self.term.renderable_content().colors;
            let term_grid = self.term.grid();
            let cols = term_grid.columns();
            for back in (1..=history).rev() {
                let row = &term_grid[Line(-(back as i32))];
                let mut line: ScrollbackLine = Vec::with_capacity(cols);
                for col in 0..cols {
                    line.push(pack_cell(&row[Column(col)], palette));
                }
                grid.push_scrollback(line);
            }
        }
        self.term.grid_mut().clear_history();
    }
}

/// Everything the grid lock protects: the parser and the packed state it
/// mirrors into. The facade wraps this in `Arc<FairMutex<EmuState>>`.
pub struct EmuState {
    pub(crate) vt: VtAdapter,
    pub(crate) grid: CellGrid,
}

impl EmuState {
    pub fn new(
        rows: usize,
        cols: usize,
        scrollback_lines: usize,
        events: mpsc::Sender<TerminalEvent>,
    ) -> Self {
        let mut vt = VtAdapter::new(rows, cols, scrollback_lines, events);
        let mut grid = CellGrid::new(rows, cols, scrollback_lines);
        // Populate every cell with the default colors before the first
        // snapshot can be taken.
        vt.full_sync(&mut grid);
        Self { vt, grid }
    }

    pub fn input(&mut self, bytes: &[u8]) -> usize {
        self.vt.input(&mut self.grid, bytes)
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.vt.resize(&mut self.grid, rows, cols);
    }
}
