//! Outbound terminal lifecycle notifications.
//!
//! Other subsystems (a remote-control plugin, a status bar, scripting hooks)
//! observe terminals through an [`EventSink`] handed to the coordinator.

use crate::ids::{PageId, TabId, TerminalId, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    Created {
        window_id: WindowId,
        tab_id: TabId,
        terminal_id: TerminalId,
    },
    Closed {
        window_id: WindowId,
        tab_id: Option<TabId>,
        terminal_id: TerminalId,
    },
    Bell {
        window_id: WindowId,
        page_id: PageId,
        tab_id: TabId,
    },
    TitleChanged {
        window_id: WindowId,
        tab_id: TabId,
        title: String,
    },
    /// A live terminal arrived from another pool
    Attached {
        window_id: WindowId,
        tab_id: TabId,
        terminal_id: TerminalId,
    },
    /// A live terminal left for another pool
    Detached {
        window_id: WindowId,
        tab_id: TabId,
    },
    /// Pages, panels or tabs were added, removed, reordered or renamed
    StructureChanged { window_id: WindowId },
}

/// Receiver of terminal events. Delivery is fire-and-forget.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TerminalEvent);
}

/// Sink that discards everything
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: TerminalEvent) {}
}

/// Sink that writes every event to the log at debug level
#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: TerminalEvent) {
        log::debug!("terminal event: {:?}", event);
    }
}
