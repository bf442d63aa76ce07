//! Drag-and-drop structural changes, captured now and applied later.
//!
//! While a drag gesture is running the view's own drag bookkeeping points at
//! live panels and tabs, so nothing may change underneath it. Drops are
//! recorded as [`DropIntent`]s and only executed against the
//! [`WindowManager`] once the gesture has ended.

use crate::command::{CommandError, CommandResult, PanelCommand, TabCommand, WindowCommand};
use crate::ids::{PanelId, TabId, WindowId};
use crate::layout::Edge;
use crate::window_manager::{ManagerError, WindowManager};

/// A structural change requested by a drop
#[derive(Debug, Clone, PartialEq)]
pub enum DropIntent {
    /// Drop a tab onto a panel's tab strip
    MergeTab {
        tab_id: TabId,
        target_panel: PanelId,
        /// `None` appends
        index: Option<usize>,
    },
    /// Drop a tab onto a panel edge: the tab gets a panel of its own there
    SplitWithNewPanel {
        tab_id: TabId,
        target_panel: PanelId,
        edge: Edge,
    },
    /// Drop a whole panel onto another panel's edge
    MovePanel {
        panel_id: PanelId,
        target_panel: PanelId,
        edge: Edge,
    },
    /// Drop a tab outside its window: into another window, or a new one
    MoveToWindow {
        tab_id: TabId,
        /// `None` opens a new window for the tab
        to: Option<WindowId>,
        target_panel: Option<PanelId>,
        index: Option<usize>,
    },
}

pub type DropOutcome = Result<(), ManagerError>;

/// Intents waiting for the current drag gesture to finish
#[derive(Debug, Default)]
pub struct DropIntentQueue {
    gesture_active: bool,
    pending: Vec<DropIntent>,
}

impl DropIntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_gesture(&mut self) {
        if self.gesture_active {
            log::debug!("Drag gesture started while another was active");
        }
        self.gesture_active = true;
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    /// Record a drop; nothing is touched until [`execute`](Self::execute)
    pub fn capture(&mut self, intent: DropIntent) {
        log::debug!("Captured drop intent {:?}", intent);
        self.pending.push(intent);
    }

    pub fn pending(&self) -> &[DropIntent] {
        &self.pending
    }

    pub fn end_gesture(&mut self) {
        self.gesture_active = false;
    }

    /// The drag was abandoned: forget what it captured
    pub fn cancel_gesture(&mut self) {
        self.gesture_active = false;
        if !self.pending.is_empty() {
            log::debug!("Drag cancelled; dropping {} intents", self.pending.len());
        }
        self.pending.clear();
    }

    /// Apply every captured intent in order
    ///
    /// Does nothing while a gesture is still active. Each intent succeeds or
    /// fails on its own; one failure does not stop the rest.
    pub fn execute(&mut self, manager: &mut WindowManager) -> Vec<DropOutcome> {
        if self.gesture_active {
            log::debug!(
                "Deferring {} drop intents until the gesture ends",
                self.pending.len()
            );
            return Vec::new();
        }
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|intent| {
                let outcome = apply(manager, &intent);
                if let Err(err) = &outcome {
                    log::warn!("Drop intent {:?} failed: {}", intent, err);
                }
                outcome
            })
            .collect()
    }
}

fn apply(manager: &mut WindowManager, intent: &DropIntent) -> DropOutcome {
    match *intent {
        DropIntent::MergeTab {
            tab_id,
            target_panel,
            index,
        } => merge_tab(manager, tab_id, target_panel, index),
        DropIntent::SplitWithNewPanel {
            tab_id,
            target_panel,
            edge,
        } => split_with_new_panel(manager, tab_id, target_panel, edge),
        DropIntent::MovePanel {
            panel_id,
            target_panel,
            edge,
        } => {
            let window_id = window_of_panel(manager, panel_id)?;
            perform_in(
                manager,
                window_id,
                PanelCommand::MoveInLayout {
                    source: panel_id,
                    target: target_panel,
                    edge,
                },
            )
        }
        DropIntent::MoveToWindow {
            tab_id,
            to: Some(to),
            target_panel,
            index,
        } => {
            let outcome = manager.move_tab(tab_id, to, target_panel, index)?;
            log::debug!("Tab {} dropped into window {}: {:?}", tab_id, to, outcome);
            Ok(())
        }
        DropIntent::MoveToWindow { tab_id, to: None, .. } => {
            manager.move_tab_to_new_window(tab_id).map(drop)
        }
    }
}

/// Same window: a plain move. Other window: a migration into that panel.
fn merge_tab(
    manager: &mut WindowManager,
    tab_id: TabId,
    target_panel: PanelId,
    index: Option<usize>,
) -> DropOutcome {
    let from = window_of_tab(manager, tab_id)?;
    let to = window_of_panel(manager, target_panel)?;
    if from == to {
        perform_in(
            manager,
            to,
            TabCommand::Move {
                tab_id,
                to_panel: target_panel,
                index,
            },
        )
    } else {
        manager
            .move_tab(tab_id, to, Some(target_panel), index)
            .map(drop)
    }
}

/// A tab that is alone in its panel moves with its panel instead of being
/// pulled into a new one, so its terminal stays where it is.
fn split_with_new_panel(
    manager: &mut WindowManager,
    tab_id: TabId,
    target_panel: PanelId,
    edge: Edge,
) -> DropOutcome {
    let from = window_of_tab(manager, tab_id)?;
    let to = window_of_panel(manager, target_panel)?;
    if from != to {
        // Bring the tab over first, then split it out next to the target
        manager.move_tab(tab_id, to, Some(target_panel), None)?;
        return perform_in(
            manager,
            to,
            PanelCommand::SplitWithTab {
                tab_id,
                target: target_panel,
                edge,
            },
        );
    }

    let sole_panel = manager.get(from).and_then(|coordinator| {
        let window = coordinator.window();
        let location = window.find_tab(tab_id)?;
        let panel = window.panel(location.panel_id)?;
        (panel.tab_count() == 1 && panel.id() != target_panel).then_some(panel.id())
    });
    let command = match sole_panel {
        Some(source) => PanelCommand::MoveInLayout {
            source,
            target: target_panel,
            edge,
        },
        None => PanelCommand::SplitWithTab {
            tab_id,
            target: target_panel,
            edge,
        },
    };
    perform_in(manager, from, command)
}

fn perform_in(
    manager: &mut WindowManager,
    window_id: WindowId,
    command: impl Into<WindowCommand>,
) -> DropOutcome {
    let coordinator = manager
        .get_mut(window_id)
        .ok_or(ManagerError::WindowNotFound(window_id))?;
    into_outcome(coordinator.perform(command))
}

fn into_outcome(result: CommandResult) -> DropOutcome {
    match result.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn window_of_tab(manager: &WindowManager, tab_id: TabId) -> Result<WindowId, ManagerError> {
    manager
        .find_tab(tab_id)
        .ok_or(ManagerError::TabNotFound(tab_id))
}

fn window_of_panel(manager: &WindowManager, panel_id: PanelId) -> Result<WindowId, ManagerError> {
    manager
        .find_panel(panel_id)
        .ok_or(ManagerError::Command(CommandError::PanelNotFound(panel_id)))
}
