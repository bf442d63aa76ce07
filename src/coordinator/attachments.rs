//! Buffer for detached terminals that arrive before the pool exists.

use crate::ids::TabId;
use crate::pool::DetachedTerminal;
use std::collections::HashMap;

/// Handles waiting for a destination pool, keyed by the tab they belong to
///
/// Drained exactly once. Anything still inside when the buffer is dropped
/// is reported as a leak.
#[derive(Debug, Default)]
pub struct PendingAttachments {
    handles: HashMap<TabId, DetachedTerminal>,
    /// Displaced handles, destroyed once a pool exists
    retired: Vec<DetachedTerminal>,
    drained: bool,
}

impl PendingAttachments {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.handles.contains_key(&tab_id)
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Buffer a handle. A handle already buffered for the same tab is returned.
    pub fn insert(&mut self, tab_id: TabId, handle: DetachedTerminal) -> Option<DetachedTerminal> {
        if self.drained {
            log::warn!(
                "Buffering terminal for tab {} after the attachment buffer was drained",
                tab_id
            );
        }
        self.handles.insert(tab_id, handle)
    }

    /// Take one tab's handle back out (the tab never arrived)
    pub fn remove(&mut self, tab_id: TabId) -> Option<DetachedTerminal> {
        self.handles.remove(&tab_id)
    }

    /// Keep a handle that lost its tab until a pool can destroy it
    pub fn retire(&mut self, handle: DetachedTerminal) {
        self.retired.push(handle);
    }

    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    pub fn take_retired(&mut self) -> Vec<DetachedTerminal> {
        std::mem::take(&mut self.retired)
    }

    /// Take every buffered handle; later calls return nothing
    pub fn drain(&mut self) -> Vec<(TabId, DetachedTerminal)> {
        if self.drained && self.handles.is_empty() {
            return Vec::new();
        }
        self.drained = true;
        self.handles.drain().collect()
    }
}

impl Drop for PendingAttachments {
    fn drop(&mut self) {
        for (tab_id, handle) in self.handles.iter() {
            log::error!(
                "Pending attachment for tab {} (terminal {}) was never claimed",
                tab_id,
                handle.origin_id()
            );
        }
        for handle in &self.retired {
            log::error!(
                "Displaced terminal {} was never destroyed",
                handle.origin_id()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TerminalId;

    #[test]
    fn test_drain_happens_once() {
        let mut pending = PendingAttachments::default();
        let tab = TabId::new();
        assert!(pending.insert(tab, DetachedTerminal::new(TerminalId(1), None, ())).is_none());
        assert!(pending.contains(tab));

        let drained = pending.drain();
        assert_eq!(drained.len(), 1);
        assert!(pending.is_drained());
        assert!(pending.drain().is_empty());

        for (_, handle) in drained {
            handle.discard();
        }
    }

    #[test]
    fn test_second_handle_for_tab_is_returned() {
        let mut pending = PendingAttachments::default();
        let tab = TabId::new();
        let _ = pending.insert(tab, DetachedTerminal::new(TerminalId(1), None, 1u8));
        let displaced = pending
            .insert(tab, DetachedTerminal::new(TerminalId(2), None, 2u8))
            .unwrap();
        assert_eq!(displaced.origin_id(), TerminalId(1));
        displaced.discard();
        for (_, handle) in pending.drain() {
            handle.discard();
        }
    }

    #[test]
    fn test_retired_handles_are_taken_once() {
        let mut pending = PendingAttachments::default();
        pending.retire(DetachedTerminal::new(TerminalId(4), None, ()));
        assert_eq!(pending.retired_count(), 1);

        let retired = pending.take_retired();
        assert_eq!(retired.len(), 1);
        assert!(pending.take_retired().is_empty());
        for handle in retired {
            handle.discard();
        }
    }
}
