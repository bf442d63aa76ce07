//! Headless in-process terminal pool.
//!
//! Terminals here have no process behind them: input is appended to the
//! scrollback, the working directory is whatever the pool was told, and
//! events are queued by the test or embedding code. This is what the CLI
//! `check` command and the test suite run against.

use super::{DetachedTerminal, PoolError, PoolEvent, TerminalMode, TerminalPool};
use crate::ids::{TabId, TerminalId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// State of one in-memory terminal. Travels as the payload of a detached handle.
#[derive(Debug, Clone)]
struct MemoryTerminal {
    stable_id: Option<TabId>,
    cols: u16,
    rows: u16,
    shell: String,
    env: Vec<(String, String)>,
    /// Directory the "process" runs in
    process_cwd: Option<PathBuf>,
    /// Directory last reported by the shell
    reported_cwd: Option<PathBuf>,
    mode: TerminalMode,
    scrollback: String,
    scroll_offset: i64,
    search: Option<MemorySearch>,
    running_process: bool,
    selection: Option<String>,
}

#[derive(Debug, Clone)]
struct MemorySearch {
    match_count: usize,
    current: usize,
}

impl MemoryTerminal {
    fn new(
        cols: u16,
        rows: u16,
        shell: &str,
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Self {
        Self {
            stable_id: None,
            cols,
            rows,
            shell: shell.to_string(),
            env: env.to_vec(),
            process_cwd: cwd.map(Path::to_path_buf),
            reported_cwd: None,
            mode: TerminalMode::Active,
            scrollback: String::new(),
            scroll_offset: 0,
            search: None,
            running_process: false,
            selection: None,
        }
    }

    fn cursor(&self) -> (u16, u16) {
        let lines: Vec<&str> = self.scrollback.split('\n').collect();
        let last = lines.last().map_or(0, |l| l.chars().count());
        let col = (last % usize::from(self.cols.max(1))) as u16;
        let row = (lines.len().saturating_sub(1)).min(usize::from(self.rows.saturating_sub(1)));
        (col, row as u16)
    }
}

/// A terminal pool that keeps everything in memory
#[derive(Debug)]
pub struct MemoryTerminalPool {
    terminals: HashMap<TerminalId, MemoryTerminal>,
    next_id: u64,
    default_shell: String,
    /// Number of upcoming create calls that should fail
    failures_pending: usize,
    creations: usize,
    destroyed: usize,
    events: Vec<PoolEvent>,
}

impl Default for MemoryTerminalPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTerminalPool {
    pub fn new() -> Self {
        Self::with_shell("sh")
    }

    /// Pool whose `create_terminal_with_id` terminals run `shell`
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            terminals: HashMap::new(),
            next_id: 1,
            default_shell: shell.into(),
            failures_pending: 0,
            creations: 0,
            destroyed: 0,
            events: Vec::new(),
        }
    }

    /// Start numbering terminals at `first` (keeps ids of two pools apart)
    pub fn with_first_id(mut self, first: u64) -> Self {
        self.next_id = first;
        self
    }

    /// Make the next `count` creation calls fail
    pub fn fail_next_creates(&mut self, count: usize) {
        self.failures_pending = count;
    }

    /// Simulate the shell reporting its directory
    pub fn set_reported_cwd(&mut self, id: TerminalId, path: impl Into<PathBuf>) -> bool {
        match self.terminals.get_mut(&id) {
            Some(term) => {
                let path = path.into();
                term.reported_cwd = Some(path.clone());
                self.events.push(PoolEvent::CwdChanged {
                    terminal_id: id,
                    path,
                });
                true
            }
            None => false,
        }
    }

    /// Simulate the process changing directory without telling the shell integration
    pub fn set_process_cwd(&mut self, id: TerminalId, path: impl Into<PathBuf>) -> bool {
        match self.terminals.get_mut(&id) {
            Some(term) => {
                term.process_cwd = Some(path.into());
                true
            }
            None => false,
        }
    }

    pub fn set_running_process(&mut self, id: TerminalId, running: bool) {
        if let Some(term) = self.terminals.get_mut(&id) {
            term.running_process = running;
        }
    }

    pub fn set_selection(&mut self, id: TerminalId, text: Option<String>) {
        if let Some(term) = self.terminals.get_mut(&id) {
            term.selection = text;
        }
    }

    /// Queue an event as if the terminal had raised it
    pub fn push_event(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    pub fn contains(&self, id: TerminalId) -> bool {
        self.terminals.contains_key(&id)
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Successful creations over the pool's lifetime (attachments excluded)
    pub fn creation_count(&self) -> usize {
        self.creations
    }

    /// Detached handles this pool has destroyed
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    pub fn mode_of(&self, id: TerminalId) -> Option<TerminalMode> {
        self.terminals.get(&id).map(|t| t.mode)
    }

    pub fn size_of(&self, id: TerminalId) -> Option<(u16, u16)> {
        self.terminals.get(&id).map(|t| (t.cols, t.rows))
    }

    pub fn stable_id_of(&self, id: TerminalId) -> Option<TabId> {
        self.terminals.get(&id).and_then(|t| t.stable_id)
    }

    pub fn shell_of(&self, id: TerminalId) -> Option<&str> {
        self.terminals.get(&id).map(|t| t.shell.as_str())
    }

    /// Extra environment the terminal was launched with
    pub fn env_of(&self, id: TerminalId) -> Option<&[(String, String)]> {
        self.terminals.get(&id).map(|t| t.env.as_slice())
    }

    pub fn scrollback(&self, id: TerminalId) -> Option<&str> {
        self.terminals.get(&id).map(|t| t.scrollback.as_str())
    }

    pub fn scroll_offset(&self, id: TerminalId) -> Option<i64> {
        self.terminals.get(&id).map(|t| t.scroll_offset)
    }

    /// Current search match index, if a search is running
    pub fn search_position(&self, id: TerminalId) -> Option<usize> {
        self.terminals
            .get(&id)
            .and_then(|t| t.search.as_ref())
            .map(|s| s.current)
    }

    fn allocate_id(&mut self) -> TerminalId {
        let id = TerminalId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_new(&mut self, term: MemoryTerminal) -> Result<TerminalId, PoolError> {
        if self.failures_pending > 0 {
            self.failures_pending -= 1;
            return Err(PoolError::CreateFailed("simulated spawn failure".to_string()));
        }
        let id = self.allocate_id();
        self.terminals.insert(id, term);
        self.creations += 1;
        log::debug!("Memory pool created terminal {}", id);
        Ok(id)
    }
}

impl TerminalPool for MemoryTerminalPool {
    fn create_terminal(
        &mut self,
        cols: u16,
        rows: u16,
        shell: &str,
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<TerminalId, PoolError> {
        self.insert_new(MemoryTerminal::new(cols, rows, shell, cwd, env))
    }

    fn create_terminal_with_id(
        &mut self,
        stable_id: TabId,
        cols: u16,
        rows: u16,
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<TerminalId, PoolError> {
        let mut term = MemoryTerminal::new(cols, rows, &self.default_shell, cwd, env);
        term.stable_id = Some(stable_id);
        self.insert_new(term)
    }

    fn close_terminal(&mut self, id: TerminalId) -> bool {
        match self.terminals.get(&id) {
            Some(term) if term.running_process => {
                log::debug!("Refusing graceful close of busy terminal {}", id);
                false
            }
            Some(_) => self.terminals.remove(&id).is_some(),
            None => false,
        }
    }

    fn close_terminal_force(&mut self, id: TerminalId) -> bool {
        self.terminals.remove(&id).is_some()
    }

    fn set_mode(&mut self, id: TerminalId, mode: TerminalMode) {
        if let Some(term) = self.terminals.get_mut(&id) {
            term.mode = mode;
        }
    }

    fn resize_terminal(&mut self, id: TerminalId, cols: u16, rows: u16) -> bool {
        match self.terminals.get_mut(&id) {
            Some(term) => {
                term.cols = cols.max(1);
                term.rows = rows.max(1);
                true
            }
            None => false,
        }
    }

    fn detach_terminal(&mut self, id: TerminalId) -> Option<DetachedTerminal> {
        let term = self.terminals.remove(&id)?;
        let cwd = term
            .reported_cwd
            .clone()
            .or_else(|| term.process_cwd.clone());
        Some(DetachedTerminal::new(id, cwd, term))
    }

    fn attach_terminal(
        &mut self,
        handle: DetachedTerminal,
    ) -> Result<TerminalId, (PoolError, DetachedTerminal)> {
        let origin = handle.origin_id();
        match handle.into_payload::<MemoryTerminal>() {
            Ok(term) => {
                let id = self.allocate_id();
                self.terminals.insert(id, term);
                log::debug!("Memory pool attached terminal {} as {}", origin, id);
                Ok(id)
            }
            Err(handle) => Err((PoolError::IncompatibleHandle, handle)),
        }
    }

    fn destroy_detached(&mut self, handle: DetachedTerminal) {
        let origin = handle.origin_id();
        self.destroyed += 1;
        match handle.into_payload::<MemoryTerminal>() {
            Ok(_) => log::debug!("Destroyed detached terminal {}", origin),
            Err(handle) => {
                handle.discard();
                log::warn!("Destroyed foreign detached terminal {}", origin);
            }
        }
    }

    fn get_cwd(&self, id: TerminalId) -> Option<PathBuf> {
        self.terminals.get(&id).and_then(|t| t.process_cwd.clone())
    }

    fn get_cached_cwd(&self, id: TerminalId) -> Option<PathBuf> {
        self.terminals.get(&id).and_then(|t| t.reported_cwd.clone())
    }

    fn has_running_process(&self, id: TerminalId) -> bool {
        self.terminals.get(&id).is_some_and(|t| t.running_process)
    }

    fn write_input(&mut self, id: TerminalId, data: &[u8]) -> bool {
        match self.terminals.get_mut(&id) {
            Some(term) => {
                term.scrollback.push_str(&String::from_utf8_lossy(data));
                term.scroll_offset = 0;
                true
            }
            None => false,
        }
    }

    fn scroll(&mut self, id: TerminalId, delta: i32) -> bool {
        match self.terminals.get_mut(&id) {
            Some(term) => {
                term.scroll_offset = (term.scroll_offset + i64::from(delta)).max(0);
                true
            }
            None => false,
        }
    }

    fn search(&mut self, id: TerminalId, pattern: &str) -> usize {
        let Some(term) = self.terminals.get_mut(&id) else {
            return 0;
        };
        let match_count = if pattern.is_empty() {
            0
        } else {
            term.scrollback.matches(pattern).count()
        };
        term.search = Some(MemorySearch {
            match_count,
            current: 0,
        });
        match_count
    }

    fn search_next(&mut self, id: TerminalId) {
        if let Some(search) = self.terminals.get_mut(&id).and_then(|t| t.search.as_mut())
            && search.match_count > 0
        {
            search.current = (search.current + 1) % search.match_count;
        }
    }

    fn search_prev(&mut self, id: TerminalId) {
        if let Some(search) = self.terminals.get_mut(&id).and_then(|t| t.search.as_mut())
            && search.match_count > 0
        {
            search.current = (search.current + search.match_count - 1) % search.match_count;
        }
    }

    fn clear_search(&mut self, id: TerminalId) {
        if let Some(term) = self.terminals.get_mut(&id) {
            term.search = None;
        }
    }

    fn selection_text(&self, id: TerminalId) -> Option<String> {
        self.terminals.get(&id).and_then(|t| t.selection.clone())
    }

    fn cursor_position(&self, id: TerminalId) -> Option<(u16, u16)> {
        self.terminals.get(&id).map(MemoryTerminal::cursor)
    }

    fn poll_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_attach_preserves_state() {
        let mut source = MemoryTerminalPool::new();
        let mut dest = MemoryTerminalPool::new().with_first_id(100);

        let id = source
            .create_terminal(80, 24, "zsh", Some(Path::new("/srv")), &[])
            .unwrap();
        source.set_reported_cwd(id, "/srv/app");
        source.write_input(id, b"make test\n");
        let before = source.get_cwd(id);

        let handle = source.detach_terminal(id).unwrap();
        assert_eq!(handle.cwd(), Some(Path::new("/srv/app")));
        assert!(!source.contains(id));
        assert!(!source.write_input(id, b"x"));

        let new_id = dest.attach_terminal(handle).unwrap();
        assert_eq!(new_id, TerminalId(100));
        assert_eq!(dest.get_cwd(new_id), before);
        assert_eq!(dest.scrollback(new_id), Some("make test\n"));
        assert_eq!(dest.creation_count(), 0);
    }

    #[test]
    fn test_attach_foreign_handle_is_returned() {
        let mut pool = MemoryTerminalPool::new();
        let foreign = DetachedTerminal::new(TerminalId(9), None, "not a terminal");
        let (err, handle) = pool.attach_terminal(foreign).unwrap_err();
        assert_eq!(err, PoolError::IncompatibleHandle);
        assert_eq!(handle.origin_id(), TerminalId(9));
        pool.destroy_detached(handle);
        assert_eq!(pool.terminal_count(), 0);
    }

    #[test]
    fn test_simulated_create_failure() {
        let mut pool = MemoryTerminalPool::new();
        pool.fail_next_creates(1);
        assert!(pool.create_terminal_with_id(TabId::new(), 80, 24, None, &[]).is_err());
        assert!(pool.create_terminal_with_id(TabId::new(), 80, 24, None, &[]).is_ok());
        assert_eq!(pool.creation_count(), 1);
    }

    #[test]
    fn test_graceful_close_refuses_busy_terminal() {
        let mut pool = MemoryTerminalPool::new();
        let id = pool.create_terminal(80, 24, "sh", None, &[]).unwrap();
        pool.set_running_process(id, true);
        assert!(pool.has_running_process(id));
        assert!(!pool.close_terminal(id));
        assert!(pool.close_terminal_force(id));
        assert!(!pool.contains(id));
    }

    #[test]
    fn test_search_counts_and_wraps() {
        let mut pool = MemoryTerminalPool::new();
        let id = pool.create_terminal(80, 24, "sh", None, &[]).unwrap();
        pool.write_input(id, b"error one\nerror two\n");
        assert_eq!(pool.search(id, "error"), 2);
        pool.search_prev(id);
        assert_eq!(pool.search_position(id), Some(1));
        pool.search_next(id);
        assert_eq!(pool.search_position(id), Some(0));
        pool.clear_search(id);
        assert_eq!(pool.search_position(id), None);
    }
}
