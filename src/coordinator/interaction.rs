//! Latency-sensitive paths (input, scrolling, search) and inbound pool events.
//!
//! Everything here renders through `request_immediate`: the user is waiting
//! on the result, so these requests skip the debounce.

use super::Coordinator;
use crate::command::{CloseScope, CommandError, TabCommand};
use crate::events::TerminalEvent;
use crate::ids::{PanelId, TerminalId};
use crate::model::SearchState;
use crate::pool::PoolEvent;
use crate::render::FontSizeOp;

impl Coordinator {
    /// Send bytes to the active tab's terminal
    pub fn write_input(&mut self, data: &[u8]) -> bool {
        let Some(terminal_id) = self.active_terminal() else {
            return false;
        };
        let written = self
            .pool
            .as_deref_mut()
            .is_some_and(|pool| pool.write_input(terminal_id, data));
        if written {
            self.scheduler.request_immediate();
        }
        written
    }

    /// Scroll the active tab's terminal by `delta` lines (positive is up)
    pub fn scroll(&mut self, delta: i32) -> bool {
        let Some(terminal_id) = self.active_terminal() else {
            return false;
        };
        let scrolled = self
            .pool
            .as_deref_mut()
            .is_some_and(|pool| pool.scroll(terminal_id, delta));
        if scrolled {
            self.scheduler.request_immediate();
        }
        scrolled
    }

    pub fn change_font_size(&mut self, op: FontSizeOp) {
        self.scheduler.surface().change_font_size(op);
        self.scheduler.request_immediate();
    }

    /// Selected text in the active tab's terminal
    pub fn selection_text(&self) -> Option<String> {
        let terminal_id = self.active_terminal()?;
        self.pool.as_deref()?.selection_text(terminal_id)
    }

    /// Cursor (col, row) in the active tab's terminal
    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        let terminal_id = self.active_terminal()?;
        self.pool.as_deref()?.cursor_position(terminal_id)
    }

    /// Start a search in the active tab; returns the number of matches
    ///
    /// The search stays bound to the active panel until cleared or until that
    /// panel is removed.
    pub fn search(&mut self, pattern: &str) -> usize {
        let Some(panel_id) = self.window.active_panel().map(|p| p.id()) else {
            return 0;
        };
        if let Some(previous) = self.search_panel
            && previous != panel_id
        {
            self.clear_search();
        }
        let Some(terminal_id) = self.active_terminal() else {
            return 0;
        };
        let Some(pool) = self.pool.as_deref_mut() else {
            return 0;
        };

        let match_count = pool.search(terminal_id, pattern);
        if let Some(tab) = self.window.active_tab_mut() {
            tab.set_search(Some(SearchState::new(pattern, match_count)));
        }
        self.search_panel = Some(panel_id);
        log::debug!("Search '{}' found {} matches", pattern, match_count);
        self.scheduler.request_immediate();
        match_count
    }

    pub fn search_next(&mut self) {
        self.step_search(true);
    }

    pub fn search_prev(&mut self) {
        self.step_search(false);
    }

    pub fn clear_search(&mut self) {
        let Some(panel_id) = self.search_panel.take() else {
            return;
        };
        if let Some(terminal_id) = self.search_terminal(panel_id)
            && let Some(pool) = self.pool.as_deref_mut()
        {
            pool.clear_search(terminal_id);
        }
        if let Some(tab) = self
            .window
            .panel_mut(panel_id)
            .and_then(|panel| panel.active_tab_mut())
        {
            tab.set_search(None);
        }
        self.scheduler.request_immediate();
    }

    fn step_search(&mut self, forward: bool) {
        let Some(panel_id) = self.search_panel else {
            return;
        };
        let Some(terminal_id) = self.search_terminal(panel_id) else {
            return;
        };
        if let Some(pool) = self.pool.as_deref_mut() {
            if forward {
                pool.search_next(terminal_id);
            } else {
                pool.search_prev(terminal_id);
            }
        }
        if let Some(search) = self
            .window
            .panel_mut(panel_id)
            .and_then(|panel| panel.active_tab_mut())
            .and_then(|tab| tab.search_mut())
        {
            if forward {
                search.next();
            } else {
                search.previous();
            }
        }
        self.scheduler.request_immediate();
    }

    fn search_terminal(&self, panel_id: PanelId) -> Option<TerminalId> {
        self.window.panel(panel_id)?.visible_terminal_id()
    }

    fn active_terminal(&self) -> Option<TerminalId> {
        self.window.active_tab()?.terminal_id()
    }

    /// Drain the pool's notifications and act on them
    ///
    /// Returns true when the window has nothing left to show (the process of
    /// its last tab exited) and should be closed by the caller.
    pub fn handle_pool_events(&mut self) -> bool {
        let Some(pool) = self.pool.as_deref_mut() else {
            return false;
        };
        let events = pool.poll_events();
        let mut window_should_close = false;
        for event in events {
            match event {
                PoolEvent::Bell(terminal_id) => self.on_bell(terminal_id),
                PoolEvent::TitleChanged { terminal_id, title } => {
                    self.on_title_changed(terminal_id, title)
                }
                PoolEvent::CwdChanged { terminal_id, path } => {
                    if self.registry.update_reported(terminal_id, path).is_none() {
                        log::trace!("Directory report from unknown terminal {}", terminal_id);
                    }
                }
                PoolEvent::ProcessExited(terminal_id) => {
                    window_should_close |= self.on_process_exited(terminal_id);
                }
            }
        }
        window_should_close
    }

    fn on_bell(&mut self, terminal_id: TerminalId) {
        let Some((location, tab_id)) = self.window.find_terminal(terminal_id) else {
            return;
        };
        if location.page_id != self.window.active_page_id()
            && let Some(page) = self.window.page_mut(location.page_id)
            && !page.needs_attention()
        {
            page.set_needs_attention(true);
            self.scheduler
                .surface()
                .set_page_needs_attention(location.page_id, true);
        }
        self.events.emit(TerminalEvent::Bell {
            window_id: self.window.id(),
            page_id: location.page_id,
            tab_id,
        });
        self.scheduler.request();
    }

    fn on_title_changed(&mut self, terminal_id: TerminalId, title: String) {
        let Some((_, tab_id)) = self.window.find_terminal(terminal_id) else {
            return;
        };
        let window_id = self.window.id();
        if let Some(tab) = self.window.tab_mut(tab_id) {
            // An empty title hands the tab back its own title
            tab.set_title_override(Some(title).filter(|t| !t.is_empty()));
            self.events.emit(TerminalEvent::TitleChanged {
                window_id,
                tab_id,
                title: tab.display_title().to_string(),
            });
        }
        self.scheduler.request();
    }

    /// The shell of a tab exited: close the tab
    fn on_process_exited(&mut self, terminal_id: TerminalId) -> bool {
        let Some((location, tab_id)) = self.window.find_terminal(terminal_id) else {
            return false;
        };
        log::info!("Terminal {} of tab {} exited", terminal_id, tab_id);
        let result = self.perform(TabCommand::Close {
            panel_id: location.panel_id,
            scope: CloseScope::Single(tab_id),
        });
        if result.error == Some(CommandError::CannotCloseLastTab) {
            // Last tab of the window: the caller closes the window
            return true;
        }
        false
    }
}
