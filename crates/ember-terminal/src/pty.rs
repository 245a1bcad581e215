//! PTY session: child shell on a pseudoterminal, reader thread, teardown.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use alacritty_terminal::sync::FairMutex;
use anyhow::Context;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

use crate::error::TerminalError;
use crate::vt::EmuState;

/// Reader buffer size per blocking read.
const READ_BUFFER_SIZE: usize = 4096;

/// Detect the user's shell: `$SHELL`, falling back to `/bin/sh`.
pub fn detect_shell() -> String {
    match std::env::var("SHELL") {
        Ok(shell) if !shell.is_empty() => shell,
        _ => "/bin/sh".to_string(),
    }
}

fn pty_size(rows: usize, cols: usize) -> PtySize {
    PtySize {
        rows: u16::try_from(rows).unwrap_or(u16::MAX),
        cols: u16::try_from(cols).unwrap_or(u16::MAX),
        pixel_width: 0,
        pixel_height: 0,
    }
}

/// Open a pseudoterminal at the given size and spawn a login shell on the
/// slave side. The child inherits the parent environment plus
/// `TERM=xterm-256color`.
fn spawn_pty(
    shell: &str,
    rows: usize,
    cols: usize,
) -> anyhow::Result<(Box<dyn MasterPty + Send>, Box<dyn Child + Send + Sync>)> {
    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(pty_size(rows, cols))
        .context("failed to open pseudoterminal")?;

    let mut cmd = CommandBuilder::new(shell);
    cmd.arg("-l");
    cmd.env("TERM", "xterm-256color");
    cmd.env("COLORTERM", "truecolor");

    let child = pair
        .slave
        .spawn_command(cmd)
        .with_context(|| format!("failed to spawn shell {shell:?}"))?;
    Ok((pair.master, child))
}

/// Start the background thread that pumps PTY output into the parser.
///
/// The thread holds no lock while blocked in `read`; it takes the grid lock
/// only to feed a completed span. On EOF or a non-interrupt error it clears
/// `running` and exits.
fn start_read_loop(
    state: Arc<FairMutex<EmuState>>,
    mut reader: Box<dyn Read + Send>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name("ember-pty-reader".into())
        .spawn(move || {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let mut state = state.lock();
                        state.input(&buf[..n]);
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => {
                        log::debug!("pty read ended: {}", e);
                        break;
                    }
                }
            }
            running.store(false, Ordering::SeqCst);
        })
        .expect("failed to spawn PTY reader thread")
}

/// A fully-started PTY session: master handles, child, reader thread.
///
/// The session is either completely up (all fields live, `running` set) or
/// it does not exist; the facade holds it as an `Option`. `shutdown`
/// consumes the session, so no partially-torn-down state is reachable.
pub struct PtySession {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
    reader_thread: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl PtySession {
    /// Fork the shell and bring the session up. On any failure nothing is
    /// retained: the caller's state stays "no session".
    pub fn start(
        state: Arc<FairMutex<EmuState>>,
        shell: &str,
        rows: usize,
        cols: usize,
    ) -> Result<Self, TerminalError> {
        let (master, child) = spawn_pty(shell, rows, cols).map_err(TerminalError::PtyStartFailed)?;
        let reader = master
            .try_clone_reader()
            .map_err(TerminalError::PtyStartFailed)?;
        let writer = master
            .take_writer()
            .map_err(TerminalError::PtyStartFailed)?;

        let running = Arc::new(AtomicBool::new(true));
        let reader_thread = start_read_loop(state, reader, running.clone());

        Ok(Self {
            master,
            writer,
            child,
            reader_thread: Some(reader_thread),
            running,
        })
    }

    /// Write bytes to the PTY master. A short write returns the partial
    /// count; retry policy is the caller's.
    pub fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        let n = self.writer.write(bytes)?;
        self.writer.flush()?;
        Ok(n)
    }

    /// Propagate a new window size to the child (`TIOCSWINSZ`).
    pub fn resize(&self, rows: usize, cols: usize) {
        if let Err(e) = self.master.resize(pty_size(rows, cols)) {
            log::warn!("failed to resize PTY: {}", e);
        }
    }

    /// Whether the reader has not yet observed EOF. Flips to false on its
    /// own when the child dies.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn child_pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    /// Tear the session down: kill the child, reap it, join the reader.
    /// Child death delivers EOF on the master, so the blocked read returns
    /// and the join cannot hang.
    pub fn shutdown(mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Err(e) = self.child.kill() {
            log::debug!("failed to kill child process: {}", e);
        }
        if let Err(e) = self.child.wait() {
            log::debug!("failed to reap child process: {}", e);
        }

        if let Some(thread) = self.reader_thread.take() {
            if thread.join().is_err() {
                log::debug!("reader thread panicked during join");
            }
        }
        // Master and writer drop here, closing the fds.
    }
}
