//! Render surface capability and request coalescing.
//!
//! Structural changes can arrive in bursts (closing several tabs, a pool
//! swap, a flood of title updates). `RenderScheduler` collapses requests made
//! within one debounce window into a single `request_render` call. Every new
//! request cancels the pending timer and starts a fresh one. Input-driven
//! requests go through `request_immediate` and skip the timer.

use crate::ids::PageId;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Font size adjustment forwarded to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSizeOp {
    Increase,
    Decrease,
    Reset,
}

/// The view that draws a window
pub trait RenderSurface: Send + Sync {
    fn request_render(&self);

    fn change_font_size(&self, op: FontSizeOp);

    /// Flag (or clear) a page in the page bar, e.g. after a background bell
    fn set_page_needs_attention(&self, page_id: PageId, needs_attention: bool);
}

/// Surface that draws nothing (headless runs)
#[derive(Debug, Default)]
pub struct NullRenderSurface;

impl RenderSurface for NullRenderSurface {
    fn request_render(&self) {}

    fn change_font_size(&self, _op: FontSizeOp) {}

    fn set_page_needs_attention(&self, _page_id: PageId, _needs_attention: bool) {}
}

/// Debounced front end to a `RenderSurface`
pub struct RenderScheduler {
    surface: Arc<dyn RenderSurface>,
    debounce: Duration,
    runtime: Option<Handle>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl RenderScheduler {
    /// Build a scheduler on the current tokio runtime, if there is one
    ///
    /// Without a runtime (or with a zero debounce) every request renders
    /// immediately.
    pub fn new(surface: Arc<dyn RenderSurface>, debounce: Duration) -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() && !debounce.is_zero() {
            log::debug!("No tokio runtime; render requests will not be coalesced");
        }
        Self {
            surface,
            debounce,
            runtime,
            pending: Mutex::new(None),
        }
    }

    pub fn surface(&self) -> &Arc<dyn RenderSurface> {
        &self.surface
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Ask for a render, coalescing with other requests in the debounce window
    pub fn request(&self) {
        let Some(runtime) = self.runtime.as_ref().filter(|_| !self.debounce.is_zero()) else {
            self.surface.request_render();
            return;
        };

        let surface = Arc::clone(&self.surface);
        let debounce = self.debounce;
        let task = runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            surface.request_render();
        });

        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Render now, dropping any pending debounced request
    pub fn request_immediate(&self) {
        self.cancel_pending();
        self.surface.request_render();
    }

    /// True while a debounced render is waiting to fire
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn cancel_pending(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("debounce", &self.debounce)
            .field("has_runtime", &self.runtime.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSurface {
        renders: AtomicUsize,
    }

    impl RenderSurface for CountingSurface {
        fn request_render(&self) {
            self.renders.fetch_add(1, Ordering::SeqCst);
        }

        fn change_font_size(&self, _op: FontSizeOp) {}

        fn set_page_needs_attention(&self, _page_id: PageId, _needs_attention: bool) {}
    }

    fn scheduler(debounce_ms: u64) -> (RenderScheduler, Arc<CountingSurface>) {
        let surface = Arc::new(CountingSurface::default());
        let scheduler = RenderScheduler::new(surface.clone(), Duration::from_millis(debounce_ms));
        (scheduler, surface)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_render() {
        let (scheduler, surface) = scheduler(16);
        for _ in 0..5 {
            scheduler.request();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(surface.renders.load(Ordering::SeqCst), 0);
        assert!(scheduler.has_pending());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(surface.renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_bypasses_and_cancels_debounce() {
        let (scheduler, surface) = scheduler(16);
        scheduler.request();
        scheduler.request_immediate();
        assert_eq!(surface.renders.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(surface.renders.load(Ordering::SeqCst), 1);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_without_runtime_renders_synchronously() {
        let (scheduler, surface) = scheduler(16);
        scheduler.request();
        scheduler.request();
        assert_eq!(surface.renders.load(Ordering::SeqCst), 2);
    }
}
