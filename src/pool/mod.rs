//! Terminal pool capability consumed by the coordinator
//!
//! The pool owns terminal processes; this crate only ever holds pool-local
//! `TerminalId`s. Calls are synchronous from the caller's point of view and
//! any internal threading is the pool's concern.
//!
//! - [`TerminalPool`]: the capability trait
//! - [`DetachedTerminal`]: a live connection lifted out of one pool for
//!   attachment to another
//! - [`MemoryTerminalPool`]: a headless in-process pool
//! - `Arc<Mutex<P>>`: any pool shared between the coordinator and another owner

mod handle;
mod memory;
mod shared;

pub use handle::DetachedTerminal;
pub use memory::MemoryTerminalPool;

use crate::ids::{TabId, TerminalId};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scheduling mode of a terminal inside its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalMode {
    /// On screen: full-rate rendering and processing
    Active,
    /// Off screen: the pool may throttle rendering and CPU work
    Background,
}

/// Failures reported by a terminal pool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("terminal creation failed: {0}")]
    CreateFailed(String),
    #[error("terminal {0} is not in this pool")]
    UnknownTerminal(TerminalId),
    #[error("detached terminal handle was not produced by a compatible pool")]
    IncompatibleHandle,
}

/// Notifications raised by a pool about its terminals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// The terminal rang the bell
    Bell(TerminalId),
    /// The running program set a window/tab title
    TitleChanged { terminal_id: TerminalId, title: String },
    /// The shell reported a new working directory (OSC 7)
    CwdChanged { terminal_id: TerminalId, path: PathBuf },
    /// The terminal's process exited
    ProcessExited(TerminalId),
}

/// Capability interface of a terminal pool
pub trait TerminalPool {
    /// Create a terminal running `shell`
    fn create_terminal(
        &mut self,
        cols: u16,
        rows: u16,
        shell: &str,
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<TerminalId, PoolError>;

    /// Create a terminal running the pool's default shell, keyed by a Tab's stable id
    fn create_terminal_with_id(
        &mut self,
        stable_id: TabId,
        cols: u16,
        rows: u16,
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<TerminalId, PoolError>;

    /// Close a terminal gracefully. Returns false if unknown.
    fn close_terminal(&mut self, id: TerminalId) -> bool;

    /// Close a terminal even if its process is busy
    fn close_terminal_force(&mut self, id: TerminalId) -> bool;

    fn set_mode(&mut self, id: TerminalId, mode: TerminalMode);

    fn resize_terminal(&mut self, id: TerminalId, cols: u16, rows: u16) -> bool;

    /// Lift a live terminal out of this pool without killing its process
    fn detach_terminal(&mut self, id: TerminalId) -> Option<DetachedTerminal>;

    /// Resume a detached terminal under a new local id
    ///
    /// On error the handle is handed back so it can be destroyed or retried.
    fn attach_terminal(
        &mut self,
        handle: DetachedTerminal,
    ) -> Result<TerminalId, (PoolError, DetachedTerminal)>;

    /// Tear down a detached terminal that will not be attached anywhere
    fn destroy_detached(&mut self, handle: DetachedTerminal);

    /// Working directory from OS process inspection
    fn get_cwd(&self, id: TerminalId) -> Option<PathBuf>;

    /// Working directory last reported by the shell (OSC 7)
    fn get_cached_cwd(&self, id: TerminalId) -> Option<PathBuf>;

    /// True if a foreground program other than the shell is running
    fn has_running_process(&self, id: TerminalId) -> bool;

    fn write_input(&mut self, id: TerminalId, data: &[u8]) -> bool;

    fn scroll(&mut self, id: TerminalId, delta: i32) -> bool;

    /// Start a search; returns the number of matches
    fn search(&mut self, id: TerminalId, pattern: &str) -> usize;

    fn search_next(&mut self, id: TerminalId);

    fn search_prev(&mut self, id: TerminalId);

    fn clear_search(&mut self, id: TerminalId);

    /// Currently selected text, if any
    fn selection_text(&self, id: TerminalId) -> Option<String>;

    /// Cursor position as (col, row)
    fn cursor_position(&self, id: TerminalId) -> Option<(u16, u16)>;

    /// Drain notifications raised since the last call
    fn poll_events(&mut self) -> Vec<PoolEvent>;
}
