//! `Tab`: the unit of terminal binding.

use crate::ids::{TabId, TerminalId};

/// Search state of a Tab's terminal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Pattern being searched for
    pub pattern: String,
    /// Total number of matches in the terminal (including scrollback)
    pub match_count: usize,
    /// Zero-based index of the highlighted match
    pub current_index: usize,
}

impl SearchState {
    pub fn new(pattern: impl Into<String>, match_count: usize) -> Self {
        Self {
            pattern: pattern.into(),
            match_count,
            current_index: 0,
        }
    }

    /// Advance to the next match, wrapping at the end
    pub fn next(&mut self) {
        if self.match_count > 0 {
            self.current_index = (self.current_index + 1) % self.match_count;
        }
    }

    /// Step back to the previous match, wrapping at the start
    pub fn previous(&mut self) {
        if self.match_count > 0 {
            self.current_index = (self.current_index + self.match_count - 1) % self.match_count;
        }
    }
}

/// A Tab binds a stable identifier to at most one live terminal.
///
/// The Tab owns the binding, never the terminal process itself; the pool
/// that created the terminal owns that.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    id: TabId,
    /// Title assigned at creation (or by the user)
    title: String,
    /// Title reported by the running program or a plugin; wins over `title`
    title_override: Option<String>,
    /// Runtime terminal bound to this Tab, if materialized
    terminal_id: Option<TerminalId>,
    search: Option<SearchState>,
}

impl Tab {
    /// Create a new unbound tab with a fresh stable id
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(TabId::new(), title)
    }

    /// Create a tab with a known stable id (session restore)
    pub fn with_id(id: TabId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            title_override: None,
            terminal_id: None,
            search: None,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn terminal_id(&self) -> Option<TerminalId> {
        self.terminal_id
    }

    pub fn is_materialized(&self) -> bool {
        self.terminal_id.is_some()
    }

    /// Bind a runtime terminal, returning the previous binding if any
    pub fn bind_terminal(&mut self, terminal_id: TerminalId) -> Option<TerminalId> {
        self.terminal_id.replace(terminal_id)
    }

    /// Drop the runtime binding (terminal closed or detached)
    pub fn unbind_terminal(&mut self) -> Option<TerminalId> {
        self.search = None;
        self.terminal_id.take()
    }

    /// Title to show: the override if set, else the assigned title
    pub fn display_title(&self) -> &str {
        self.title_override.as_deref().unwrap_or(&self.title)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn title_override(&self) -> Option<&str> {
        self.title_override.as_deref()
    }

    /// Set or clear the system/plugin title override
    pub fn set_title_override(&mut self, title: Option<String>) {
        self.title_override = title.filter(|t| !t.trim().is_empty());
    }

    pub fn search(&self) -> Option<&SearchState> {
        self.search.as_ref()
    }

    pub fn search_mut(&mut self) -> Option<&mut SearchState> {
        self.search.as_mut()
    }

    pub fn set_search(&mut self, search: Option<SearchState>) {
        self.search = search;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_title() {
        let mut tab = Tab::new("Tab 1");
        assert_eq!(tab.display_title(), "Tab 1");
        tab.set_title_override(Some("vim".to_string()));
        assert_eq!(tab.display_title(), "vim");
        tab.set_title_override(Some("   ".to_string()));
        assert_eq!(tab.display_title(), "Tab 1");
    }

    #[test]
    fn test_unbind_clears_search() {
        let mut tab = Tab::new("t");
        assert_eq!(tab.bind_terminal(TerminalId(3)), None);
        tab.set_search(Some(SearchState::new("err", 4)));
        assert_eq!(tab.unbind_terminal(), Some(TerminalId(3)));
        assert!(tab.search().is_none());
        assert!(!tab.is_materialized());
    }

    #[test]
    fn test_search_navigation_wraps() {
        let mut search = SearchState::new("x", 3);
        search.previous();
        assert_eq!(search.current_index, 2);
        search.next();
        assert_eq!(search.current_index, 0);

        let mut empty = SearchState::new("x", 0);
        empty.next();
        assert_eq!(empty.current_index, 0);
    }
}
