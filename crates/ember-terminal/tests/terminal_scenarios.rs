//! End-to-end scenarios driving the public facade, plus PTY lifecycle.

use ember_terminal::{EmberTerminal, TerminalError, FLAG_BOLD};

fn grid_text(term: &EmberTerminal) -> String {
    let snap = term.snapshot_grid();
    (0..snap.rows)
        .map(|r| snap.row_text(r))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn hello_lands_in_first_row() {
    let mut term = EmberTerminal::new(2, 5).unwrap();
    term.write_input(b"hi").unwrap();
    let snap = term.snapshot_grid();
    assert_eq!(snap.cell(0, 0).ch, 'h' as u32);
    assert_eq!(snap.cell(0, 1).ch, 'i' as u32);
    for col in 2..5 {
        assert_eq!(snap.cell(0, col).ch, 0);
    }
    for col in 0..5 {
        assert_eq!(snap.cell(1, col).ch, 0);
    }
    assert_eq!((snap.cursor_x, snap.cursor_y), (2, 0));
}

#[test]
fn newline_advances_row() {
    let mut term = EmberTerminal::new(2, 5).unwrap();
    term.write_input(b"a\r\nb").unwrap();
    let snap = term.snapshot_grid();
    assert_eq!(snap.cell(0, 0).ch, 'a' as u32);
    assert_eq!(snap.cell(1, 0).ch, 'b' as u32);
    assert_eq!((snap.cursor_x, snap.cursor_y), (1, 1));
}

#[test]
fn bold_sgr_marks_the_cell() {
    let mut term = EmberTerminal::new(2, 5).unwrap();
    term.write_input(b"\x1b[1mX").unwrap();
    let cell = term.snapshot_grid().cell(0, 0);
    assert_eq!(cell.ch, 'X' as u32);
    assert_eq!(cell.flags & FLAG_BOLD, FLAG_BOLD);
}

#[test]
fn red_sgr_produces_red_dominant_foreground() {
    let mut term = EmberTerminal::new(2, 5).unwrap();
    term.write_input(b"\x1b[31mR\x1b[0m").unwrap();
    let cell = term.snapshot_grid().cell(0, 0);
    assert_eq!(cell.ch, 'R' as u32);
    let (a, r, g, b) = (
        cell.fg >> 24,
        (cell.fg >> 16) & 0xFF,
        (cell.fg >> 8) & 0xFF,
        cell.fg & 0xFF,
    );
    assert_eq!(a, 0xFF);
    assert!(r > g && r > b, "fg {:08X} should be red-dominant", cell.fg);
}

#[test]
fn scrollback_drains_oldest_first_then_empty() {
    let mut term = EmberTerminal::new(2, 4).unwrap();
    term.write_input(b"L1\r\nL2\r\nL3\r\nL4\r\n").unwrap();

    let snap = term.drain_scrollback();
    assert!(!snap.is_empty());
    let lines: Vec<&[ember_terminal::Cell]> = snap.lines().collect();
    // Each newline on the bottom row evicts one line; the FIFO prefix is
    // L1, L2, ... oldest first.
    assert!(lines.len() >= 2);
    assert_eq!(lines[0][0].ch, 'L' as u32);
    assert_eq!(lines[0][1].ch, '1' as u32);
    assert_eq!(lines[1][0].ch, 'L' as u32);
    assert_eq!(lines[1][1].ch, '2' as u32);
    for line in &lines {
        assert_eq!(line.len(), 4, "eviction-time width is preserved");
    }

    assert!(term.drain_scrollback().is_empty());
}

#[test]
fn clear_screen_zeroes_every_scalar() {
    let mut term = EmberTerminal::new(3, 8).unwrap();
    term.write_input(b"some text\r\nmore").unwrap();
    term.write_input(b"\x1b[2J").unwrap();
    let snap = term.snapshot_grid();
    assert!(snap.cells.iter().all(|c| c.ch == 0));
}

#[test]
fn resize_keeps_cursor_legal_after_wrap() {
    let mut term = EmberTerminal::new(10, 80).unwrap();
    term.write_input(&[b'x'; 100]).unwrap();
    term.resize(5, 20).unwrap();
    let snap = term.snapshot_grid();
    assert_eq!(snap.cells.len(), 5 * 20);
    assert!(snap.cursor_x < 20 && snap.cursor_y < 5);
}

#[test]
fn grid_len_invariant_survives_input_and_resize() {
    let mut term = EmberTerminal::new(6, 12).unwrap();
    for chunk in [
        &b"hello\r\nworld"[..],
        &b"\x1b[31mcolored\x1b[0m"[..],
        &b"\x1b[2J"[..],
    ] {
        term.write_input(chunk).unwrap();
        let snap = term.snapshot_grid();
        assert_eq!(snap.cells.len(), snap.rows * snap.cols);
    }
    for (rows, cols) in [(3, 30), (12, 4), (6, 12)] {
        term.resize(rows, cols).unwrap();
        let snap = term.snapshot_grid();
        assert_eq!(snap.cells.len(), rows * cols);
    }
}

#[test]
fn scrollback_capacity_is_bounded() {
    let mut term = EmberTerminal::with_scrollback(2, 10, 5).unwrap();
    for i in 0..50 {
        term.write_input(format!("line {}\r\n", i).as_bytes()).unwrap();
    }
    let snap = term.drain_scrollback();
    assert!(snap.len() <= 5);
}

#[test]
fn snapshot_colors_are_always_opaque() {
    let mut term = EmberTerminal::new(4, 20).unwrap();
    term.write_input(b"\x1b[33myellow \x1b[44mon blue\x1b[0m plain\r\n")
        .unwrap();
    let snap = term.snapshot_grid();
    for cell in &snap.cells {
        assert_eq!(cell.fg >> 24, 0xFF);
        assert_eq!(cell.bg >> 24, 0xFF);
    }
}

#[cfg(unix)]
mod pty {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(mut cond: impl FnMut() -> bool, timeout: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        false
    }

    #[test]
    fn pty_round_trip_and_orderly_shutdown() {
        let mut term = EmberTerminal::new(24, 80).unwrap();
        term.start_pty_with_shell("/bin/sh").unwrap();
        assert!(term.is_pty_running());
        assert!(term.child_pid().is_some());

        term.write_input(b"echo ember_pty_marker\n").unwrap();
        let found = wait_for(
            || grid_text(&term).contains("ember_pty_marker"),
            Duration::from_secs(10),
        );
        assert!(found, "shell output never reached the grid:\n{}", grid_text(&term));

        term.stop_pty();
        assert!(!term.is_pty_running());
        assert_eq!(term.child_pid(), None);
        // Idempotent.
        term.stop_pty();
        assert!(!term.is_pty_running());
    }

    #[test]
    fn start_twice_is_rejected_without_state_change() {
        let mut term = EmberTerminal::new(24, 80).unwrap();
        term.start_pty_with_shell("/bin/sh").unwrap();
        let pid = term.child_pid();
        assert!(matches!(
            term.start_pty_with_shell("/bin/sh"),
            Err(TerminalError::PtyAlreadyRunning)
        ));
        assert_eq!(term.child_pid(), pid);
        term.stop_pty();
    }

    #[test]
    fn resize_with_live_session_keeps_invariants() {
        let mut term = EmberTerminal::new(24, 80).unwrap();
        term.start_pty_with_shell("/bin/sh").unwrap();
        term.resize(10, 40).unwrap();
        let snap = term.snapshot_grid();
        assert_eq!((snap.rows, snap.cols), (10, 40));
        assert_eq!(snap.cells.len(), 10 * 40);
        term.stop_pty();
    }

    #[test]
    fn drop_with_live_session_does_not_hang() {
        let mut term = EmberTerminal::new(24, 80).unwrap();
        term.start_pty_with_shell("/bin/sh").unwrap();
        drop(term);
    }
}
