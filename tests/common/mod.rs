//! Shared integration test helpers for termdeck.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{Recorder, coordinator_with_pool, shared_pool};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers is used per file.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use termdeck::coordinator::{Collaborators, Coordinator, CoordinatorSettings};
use termdeck::cwd::WorkingDirectoryRegistry;
use termdeck::events::{EventSink, TerminalEvent};
use termdeck::ids::{PageId, TabId, TerminalId, WindowId};
use termdeck::model::{Tab, Window};
use termdeck::pool::{MemoryTerminalPool, TerminalPool};
use termdeck::render::{FontSizeOp, RenderSurface};
use termdeck::session::{SessionPersistence, SessionWindow};
use termdeck::window_manager::WindowManager;

pub const HOME: &str = "/home/tester";

pub type SharedPool = Arc<Mutex<MemoryTerminalPool>>;

/// Render surface, persistence and event sink in one, recording every call
#[derive(Default)]
pub struct Recorder {
    renders: AtomicUsize,
    pub font_ops: Mutex<Vec<FontSizeOp>>,
    pub attention: Mutex<Vec<(PageId, bool)>>,
    pub saves: Mutex<Vec<SessionWindow>>,
    pub forgotten: Mutex<Vec<WindowId>>,
    pub events: Mutex<Vec<TerminalEvent>>,
}

impl RenderSurface for Recorder {
    fn request_render(&self) {
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn change_font_size(&self, op: FontSizeOp) {
        self.font_ops.lock().push(op);
    }

    fn set_page_needs_attention(&self, page_id: PageId, needs_attention: bool) {
        self.attention.lock().push((page_id, needs_attention));
    }
}

impl SessionPersistence for Recorder {
    fn save_session(&self, window: &SessionWindow) {
        self.saves.lock().push(window.clone());
    }

    fn forget_window(&self, window_id: WindowId) {
        self.forgotten.lock().push(window_id);
    }
}

impl EventSink for Recorder {
    fn emit(&self, event: TerminalEvent) {
        self.events.lock().push(event);
    }
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }

    pub fn count_events(&self, pred: impl Fn(&TerminalEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            surface: self.clone(),
            persistence: self.clone(),
            events: self.clone(),
        }
    }
}

/// Settings with debouncing off, so renders are counted synchronously
pub fn settings() -> CoordinatorSettings {
    CoordinatorSettings {
        render_debounce: Duration::ZERO,
        ..CoordinatorSettings::default()
    }
}

pub fn shared_pool(first_id: u64) -> SharedPool {
    Arc::new(Mutex::new(MemoryTerminalPool::new().with_first_id(first_id)))
}

/// Coordinator over `window` whose pool the test can inspect
pub fn coordinator_with_pool(
    window: Window,
    pool: &SharedPool,
    recorder: &Arc<Recorder>,
) -> Coordinator {
    Coordinator::new(
        window,
        WorkingDirectoryRegistry::new(HOME),
        Box::new(pool.clone()),
        recorder.collaborators(),
        settings(),
    )
}

/// A one-tab window on a fresh pool numbered from `first_id`
pub fn single_tab_window(first_id: u64) -> (Coordinator, SharedPool, Arc<Recorder>) {
    let pool = shared_pool(first_id);
    let recorder = Recorder::new();
    let coordinator = coordinator_with_pool(Window::with_single_tab("Tab 1"), &pool, &recorder);
    (coordinator, pool, recorder)
}

pub fn terminal_of(coordinator: &Coordinator, tab_id: TabId) -> Option<TerminalId> {
    coordinator.window().tab(tab_id).and_then(Tab::terminal_id)
}

pub fn active_tab_id(coordinator: &Coordinator) -> TabId {
    coordinator
        .window()
        .active_tab()
        .map(Tab::id)
        .expect("window has an active tab")
}

/// Manager whose windows each get their own shared pool; the pools are
/// collected in creation order so tests can look inside them
pub fn manager_with_pools(
    recorder: &Arc<Recorder>,
) -> (WindowManager, Arc<Mutex<Vec<SharedPool>>>) {
    let pools: Arc<Mutex<Vec<SharedPool>>> = Arc::default();
    let created = pools.clone();
    let manager = WindowManager::new(
        settings(),
        HOME,
        recorder.collaborators(),
        Box::new(move |_: WindowId| -> Box<dyn TerminalPool> {
            let mut created = created.lock();
            let pool = shared_pool(1 + created.len() as u64 * 1000);
            created.push(pool.clone());
            Box::new(pool)
        }),
    );
    (manager, pools)
}
