//! A pool reachable from more than one owner.
//!
//! The coordinator owns its pool as a `Box<dyn TerminalPool>`. When something
//! else needs the same pool (an I/O thread draining events, or a test that
//! inspects pool state) both sides hold an `Arc<Mutex<P>>` and the
//! coordinator gets a boxed clone of it.

use super::{DetachedTerminal, PoolError, PoolEvent, TerminalMode, TerminalPool};
use crate::ids::{TabId, TerminalId};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

impl<P: TerminalPool + ?Sized> TerminalPool for Arc<Mutex<P>> {
    fn create_terminal(
        &mut self,
        cols: u16,
        rows: u16,
        shell: &str,
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<TerminalId, PoolError> {
        self.lock().create_terminal(cols, rows, shell, cwd, env)
    }

    fn create_terminal_with_id(
        &mut self,
        stable_id: TabId,
        cols: u16,
        rows: u16,
        cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<TerminalId, PoolError> {
        self.lock()
            .create_terminal_with_id(stable_id, cols, rows, cwd, env)
    }

    fn close_terminal(&mut self, id: TerminalId) -> bool {
        self.lock().close_terminal(id)
    }

    fn close_terminal_force(&mut self, id: TerminalId) -> bool {
        self.lock().close_terminal_force(id)
    }

    fn set_mode(&mut self, id: TerminalId, mode: TerminalMode) {
        self.lock().set_mode(id, mode)
    }

    fn resize_terminal(&mut self, id: TerminalId, cols: u16, rows: u16) -> bool {
        self.lock().resize_terminal(id, cols, rows)
    }

    fn detach_terminal(&mut self, id: TerminalId) -> Option<DetachedTerminal> {
        self.lock().detach_terminal(id)
    }

    fn attach_terminal(
        &mut self,
        handle: DetachedTerminal,
    ) -> Result<TerminalId, (PoolError, DetachedTerminal)> {
        self.lock().attach_terminal(handle)
    }

    fn destroy_detached(&mut self, handle: DetachedTerminal) {
        self.lock().destroy_detached(handle)
    }

    fn get_cwd(&self, id: TerminalId) -> Option<PathBuf> {
        self.lock().get_cwd(id)
    }

    fn get_cached_cwd(&self, id: TerminalId) -> Option<PathBuf> {
        self.lock().get_cached_cwd(id)
    }

    fn has_running_process(&self, id: TerminalId) -> bool {
        self.lock().has_running_process(id)
    }

    fn write_input(&mut self, id: TerminalId, data: &[u8]) -> bool {
        self.lock().write_input(id, data)
    }

    fn scroll(&mut self, id: TerminalId, delta: i32) -> bool {
        self.lock().scroll(id, delta)
    }

    fn search(&mut self, id: TerminalId, pattern: &str) -> usize {
        self.lock().search(id, pattern)
    }

    fn search_next(&mut self, id: TerminalId) {
        self.lock().search_next(id)
    }

    fn search_prev(&mut self, id: TerminalId) {
        self.lock().search_prev(id)
    }

    fn clear_search(&mut self, id: TerminalId) {
        self.lock().clear_search(id)
    }

    fn selection_text(&self, id: TerminalId) -> Option<String> {
        self.lock().selection_text(id)
    }

    fn cursor_position(&self, id: TerminalId) -> Option<(u16, u16)> {
        self.lock().cursor_position(id)
    }

    fn poll_events(&mut self) -> Vec<PoolEvent> {
        self.lock().poll_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::MemoryTerminalPool;

    #[test]
    fn test_both_owners_see_the_same_terminals() {
        let shared = Arc::new(Mutex::new(MemoryTerminalPool::new()));
        let mut boxed: Box<dyn TerminalPool> = Box::new(Arc::clone(&shared));

        let id = boxed.create_terminal(80, 24, "sh", None, &[]).unwrap();
        assert!(shared.lock().contains(id));

        shared.lock().set_process_cwd(id, "/srv");
        assert_eq!(boxed.get_cwd(id), Some(PathBuf::from("/srv")));
    }
}
