//! Window coordinator: applies command results to the outside world
//!
//! The coordinator owns one [`Window`], its [`WorkingDirectoryRegistry`] and
//! the window's terminal pool. [`Coordinator::perform`] is the only way the
//! window changes: it runs the pure [`execute`] step and then carries out the
//! returned effects (terminal lifecycle calls, pool modes, layout sync,
//! render requests, session saves, observer notifications).
//!
//! The `impl Coordinator` is split by concern:
//! - `lifecycle.rs`: terminal creation/closing, activation, layout sync
//! - `pool_swap.rs`: deferred pools, pending attachments, pool replacement
//! - `interaction.rs`: search, input, scrolling, inbound pool events
//! - `actions.rs`: convenience wrappers that build a `WindowCommand`

mod actions;
mod attachments;
mod interaction;
mod lifecycle;
mod pool_swap;

pub use attachments::PendingAttachments;
pub use pool_swap::{Adoption, AttachOutcome};

use crate::command::{CommandResult, WindowCommand, execute};
use crate::cwd::WorkingDirectoryRegistry;
use crate::events::{EventSink, NullEventSink, TerminalEvent};
use crate::ids::{PanelId, TabId, TerminalId, WindowId};
use crate::layout::PanelBounds;
use crate::model::Window;
use crate::pool::TerminalPool;
use crate::render::{NullRenderSurface, RenderScheduler, RenderSurface};
use crate::session::{NullPersistence, SessionPersistence};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use termdeck_config::Config;

/// Sizing and timing inputs taken from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSettings {
    /// Grid size for terminals created before any layout pass
    pub cols: u16,
    pub rows: u16,
    /// Default shell for pools built from these settings
    pub shell: String,
    pub cell_width: f32,
    pub cell_height: f32,
    pub divider_width: f32,
    pub render_debounce: Duration,
}

impl CoordinatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cols: config.cols,
            rows: config.rows,
            shell: config.default_shell.clone(),
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            divider_width: config.divider_width,
            render_debounce: config.render_debounce(),
        }
    }

    /// Content area that fits the default grid exactly
    pub fn default_content_bounds(&self) -> PanelBounds {
        PanelBounds::new(
            0.0,
            0.0,
            f32::from(self.cols) * self.cell_width,
            f32::from(self.rows) * self.cell_height,
        )
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// External collaborators a coordinator reports to
#[derive(Clone)]
pub struct Collaborators {
    pub surface: Arc<dyn RenderSurface>,
    pub persistence: Arc<dyn SessionPersistence>,
    pub events: Arc<dyn EventSink>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            surface: Arc::new(NullRenderSurface),
            persistence: Arc::new(NullPersistence),
            events: Arc::new(NullEventSink),
        }
    }
}

/// Owner of one window and the terminals behind it
pub struct Coordinator {
    window: Window,
    registry: WorkingDirectoryRegistry,
    /// `None` until the pool exists (see [`Coordinator::deferred`])
    pool: Option<Box<dyn TerminalPool>>,
    pending_attachments: PendingAttachments,
    scheduler: RenderScheduler,
    persistence: Arc<dyn SessionPersistence>,
    events: Arc<dyn EventSink>,
    settings: CoordinatorSettings,
    /// Area the active page's layout is resolved into
    content_bounds: PanelBounds,
    /// Panel whose active tab owns the current search
    search_panel: Option<PanelId>,
}

impl Coordinator {
    /// Take ownership of a window and materialize its active page
    pub fn new(
        window: Window,
        registry: WorkingDirectoryRegistry,
        pool: Box<dyn TerminalPool>,
        collaborators: Collaborators,
        settings: CoordinatorSettings,
    ) -> Self {
        let mut coordinator = Self::deferred(window, registry, collaborators, settings);
        coordinator.install_pool(pool);
        coordinator
    }

    /// Window whose pool does not exist yet
    ///
    /// Terminals arriving from other windows are buffered until
    /// [`install_pool`](Self::install_pool) runs.
    pub fn deferred(
        window: Window,
        registry: WorkingDirectoryRegistry,
        collaborators: Collaborators,
        settings: CoordinatorSettings,
    ) -> Self {
        let Collaborators {
            surface,
            persistence,
            events,
        } = collaborators;
        Self {
            window,
            registry,
            pool: None,
            pending_attachments: PendingAttachments::default(),
            scheduler: RenderScheduler::new(surface, settings.render_debounce),
            persistence,
            events,
            content_bounds: settings.default_content_bounds(),
            settings,
            search_panel: None,
        }
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn registry(&self) -> &WorkingDirectoryRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn has_pool(&self) -> bool {
        self.pool.is_some()
    }

    pub fn pool(&self) -> Option<&dyn TerminalPool> {
        self.pool.as_deref()
    }

    pub fn pool_mut(&mut self) -> Option<&mut (dyn TerminalPool + 'static)> {
        self.pool.as_deref_mut()
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn content_bounds(&self) -> PanelBounds {
        self.content_bounds
    }

    pub fn search_panel(&self) -> Option<PanelId> {
        self.search_panel
    }

    /// Where a tab's shell currently is (never fails)
    pub fn working_directory(&self, tab_id: TabId) -> PathBuf {
        let terminal_id = self.window.tab(tab_id).and_then(|t| t.terminal_id());
        match self.pool.as_deref() {
            Some(pool) => self.registry.query(tab_id, terminal_id, pool),
            None => self.registry.best_known_path(tab_id),
        }
    }

    /// Apply a command and carry out its effects
    ///
    /// This is the single mutation entry point. The returned result is the
    /// one produced by the command; its lists have already been acted on.
    pub fn perform(&mut self, command: impl Into<WindowCommand>) -> CommandResult {
        let command = command.into();
        let name = command.name();
        let owners = self.terminal_owners();
        let result = execute(&mut self.window, &mut self.registry, command);

        match &result.error {
            None => self.apply(&result, &owners),
            Some(err) if err.is_expected() => {
                log::debug!("{} on window {}: {}", name, self.window.id(), err)
            }
            Some(err) => log::warn!("{} on window {} failed: {}", name, self.window.id(), err),
        }
        result
    }

    /// Carry out the effects of a successful command
    fn apply(&mut self, result: &CommandResult, owners: &HashMap<TerminalId, TabId>) {
        self.close_terminals(&result.terminals_to_close, owners);

        if let Some(panel_id) = self.search_panel
            && result.removed_panel_ids.contains(&panel_id)
        {
            self.search_panel = None;
        }

        if result.effects.sync_layout || !result.terminals_to_create.is_empty() {
            self.resolve_layout();
        }

        // Without a pool the new tabs simply stay pending until one is installed
        let mut failed = 0;
        for spec in &result.terminals_to_create {
            if self.pool.is_some()
                && self.window.tab(spec.tab_id).is_some_and(|t| !t.is_materialized())
                && self.create_terminal(spec).is_none()
            {
                failed += 1;
            }
        }
        if failed > 0 {
            log::warn!(
                "{} of {} terminals could not be created; affected tabs stay pending",
                failed,
                result.terminals_to_create.len()
            );
        }

        self.apply_modes(&result.terminals_to_activate, &result.terminals_to_deactivate);
        if result.effects.sync_layout {
            self.resize_visible_terminals();
        }
        self.clear_active_page_attention();

        if result.effects.render {
            self.scheduler.request();
        }
        if result.effects.save_session {
            self.save_session();
        }
        if result.effects.update_trigger {
            self.events.emit(TerminalEvent::StructureChanged {
                window_id: self.window.id(),
            });
        }
    }

    /// Runtime terminal → tab, for every materialized tab
    fn terminal_owners(&self) -> HashMap<TerminalId, TabId> {
        self.window
            .pages()
            .iter()
            .flat_map(|page| page.tabs())
            .filter_map(|tab| tab.terminal_id().map(|id| (id, tab.id())))
            .collect()
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("window", &self.window.id())
            .field("pages", &self.window.page_count())
            .field("tabs", &self.window.tab_count())
            .field("has_pool", &self.pool.is_some())
            .field("pending_attachments", &self.pending_attachments.len())
            .finish()
    }
}
