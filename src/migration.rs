//! Moving a tab, live terminal included, from one window to another.
//!
//! The two windows own different pools. The tab's terminal is detached from
//! the source pool and attached to the destination pool, so the shell and
//! its scrollback survive the move. When no handle can be produced (or the
//! destination cannot take it) the tab starts a fresh terminal in its last
//! known directory instead of failing the move.

use crate::command::{CommandError, TabCommand};
use crate::coordinator::{AttachOutcome, Coordinator};
use crate::ids::{PanelId, TabId};
use crate::model::Tab;
use crate::pool::DetachedTerminal;
use std::path::PathBuf;

/// A tab taken out of its window, ready to be handed to another one
#[derive(Debug)]
pub struct ReleasedTab {
    /// Unbound from any terminal
    pub tab: Tab,
    /// The tab's live terminal, if the source pool could detach it
    pub handle: Option<DetachedTerminal>,
    /// Where the tab's shell was when it left
    pub cwd: PathBuf,
}

/// Take `tab_id` out of `source`, detaching its terminal
///
/// Fails with `CannotCloseLastTab` for the window's only tab.
pub fn release_tab(source: &mut Coordinator, tab_id: TabId) -> Result<ReleasedTab, CommandError> {
    if source.window().find_tab(tab_id).is_none() {
        return Err(CommandError::TabNotFound(tab_id));
    }
    // Read before removal: removing the tab drops its registry entry
    let cwd = source.working_directory(tab_id);

    let mut removed = source.perform(TabCommand::Remove { tab_id });
    if let Some(err) = removed.error {
        return Err(err);
    }
    let Some(mut tab) = removed.released_tabs.pop() else {
        log::error!("Tab {} removed without being released", tab_id);
        return Err(CommandError::TabNotFound(tab_id));
    };

    let handle = source.detach_tab_terminal(&mut tab);
    if handle.is_none() {
        log::info!(
            "No live terminal for tab {}; it restarts in {:?}",
            tab_id,
            cwd
        );
    }
    Ok(ReleasedTab { tab, handle, cwd })
}

/// Move `tab_id` from `source` into `dest`
///
/// `panel_id` defaults to the destination's active panel and `index: None`
/// appends. The source window's last tab cannot leave
/// (`CannotCloseLastTab`); the caller closes that window instead. Both
/// windows are checked before anything is touched, so a refused move
/// leaves them as they were.
pub fn move_tab_to_window(
    source: &mut Coordinator,
    dest: &mut Coordinator,
    tab_id: TabId,
    panel_id: Option<PanelId>,
    index: Option<usize>,
) -> Result<AttachOutcome, CommandError> {
    if source.id() == dest.id() {
        return Err(CommandError::DuplicateTab(tab_id));
    }
    dest.can_adopt(tab_id, panel_id)?;

    let ReleasedTab { tab, handle, cwd } = release_tab(source, tab_id)?;
    let adoption = dest.adopt_tab(tab, handle, cwd, panel_id, index);
    if let Some(rejected) = adoption.rejected {
        source.destroy_detached(rejected);
    }
    match adoption.result.error {
        Some(err) => Err(err),
        None => {
            log::info!(
                "Moved tab {} from window {} to window {} ({:?})",
                tab_id,
                source.id(),
                dest.id(),
                adoption.outcome
            );
            Ok(adoption.outcome)
        }
    }
}
