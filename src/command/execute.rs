//! Command dispatch and the removal cascade shared by every close path.

use super::result::{CommandError, CommandResult, SmartCloseOutcome, TerminalSpec};
use super::{TabConfig, WindowCommand, page_ops, panel_ops, tab_ops};
use crate::cwd::WorkingDirectoryRegistry;
use crate::ids::{PageId, PanelId, TabId};
use crate::model::{Panel, Tab, Window};

/// Apply `command` to `window`
///
/// On success the model has been mutated and the result lists every effect
/// the caller must carry out. On failure the model is untouched and only
/// `error` is set. Closed tabs are dropped from `registry`; new tabs are
/// registered there as Pending.
pub fn execute(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    command: WindowCommand,
) -> CommandResult {
    let name = command.name();
    let outcome = match command {
        WindowCommand::Tab(cmd) => tab_ops::run(window, registry, cmd),
        WindowCommand::Panel(cmd) => panel_ops::run(window, registry, cmd),
        WindowCommand::Page(cmd) => page_ops::run(window, registry, cmd),
        WindowCommand::SmartClose => smart_close(window, registry),
    };

    match outcome {
        Ok(mut result) => {
            finish(window, &mut result);
            log::trace!(
                "{}: create={} close={} removed_panels={} removed_pages={}",
                name,
                result.terminals_to_create.len(),
                result.terminals_to_close.len(),
                result.removed_panel_ids.len(),
                result.removed_page_ids.len()
            );
            result
        }
        Err(err) => CommandResult::failure(err),
    }
}

/// Recompute activation and queue creation for the shown page
fn finish(window: &Window, result: &mut CommandResult) {
    result.success = true;

    let visible = window.visible_terminal_ids();
    result.terminals_to_deactivate = window
        .terminal_ids()
        .into_iter()
        .filter(|id| !visible.contains(id))
        .collect();
    result.terminals_to_activate = visible;

    if let Some(page) = window.active_page() {
        for tab_id in page.unmaterialized_tab_ids() {
            if !result.terminals_to_create.iter().any(|s| s.tab_id == tab_id) {
                result.terminals_to_create.push(TerminalSpec::for_tab(tab_id));
            }
        }
    }
}

fn smart_close(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
) -> Result<CommandResult, CommandError> {
    let page = window.active_page().ok_or(CommandError::NoActivePage)?;
    let panel = page.active_panel().ok_or(CommandError::NoActivePanel)?;
    let (page_id, panel_id, tab_id) = (page.id(), panel.id(), panel.active_tab_id());
    let (tab_count, panel_count) = (panel.tab_count(), page.panel_count());

    let mut result = CommandResult::ok();
    let outcome = if tab_count > 1 {
        let tab = unlink_tab(window, &mut result, tab_id)?;
        close_tab(registry, &mut result, tab);
        result.effects.render = true;
        result.effects.save_session = true;
        result.effects.update_trigger = true;
        SmartCloseOutcome::ClosedTab(tab_id)
    } else if panel_count > 1 {
        let panel = unlink_panel(window, &mut result, panel_id)?;
        close_panel(registry, &mut result, panel);
        result.effects = super::Effects::structural();
        SmartCloseOutcome::ClosedPanel(panel_id)
    } else if window.page_count() > 1 {
        close_page(window, registry, &mut result, page_id)?;
        result.effects = super::Effects::structural();
        SmartCloseOutcome::ClosedPage(page_id)
    } else {
        SmartCloseOutcome::ShouldCloseWindow
    };
    result.smart_close = Some(outcome);
    Ok(result)
}

/// Resolve an optional panel to (page, panel), defaulting to the active one
pub(super) fn resolve_panel(
    window: &Window,
    panel_id: Option<PanelId>,
) -> Result<(PageId, PanelId), CommandError> {
    match panel_id {
        Some(id) => {
            let page_id = window
                .find_panel(id)
                .ok_or(CommandError::PanelNotFound(id))?;
            Ok((page_id, id))
        }
        None => {
            let page = window.active_page().ok_or(CommandError::NoActivePage)?;
            let panel = page.active_panel().ok_or(CommandError::NoActivePanel)?;
            Ok((page.id(), panel.id()))
        }
    }
}

/// Bring a panel (and its page) into focus. Returns true if the page changed.
pub(super) fn focus_panel(window: &mut Window, page_id: PageId, panel_id: PanelId) -> bool {
    let page_changed = window.active_page_id() != page_id;
    window.set_active_page(page_id);
    if let Some(page) = window.page_mut(page_id) {
        page.set_active_panel(panel_id);
    }
    page_changed
}

pub(super) fn next_tab_title(window: &Window) -> String {
    format!("Tab {}", window.tab_count() + 1)
}

/// Build a fresh tab, register it Pending and queue its terminal
pub(super) fn new_tab(
    registry: &mut WorkingDirectoryRegistry,
    result: &mut CommandResult,
    config: Option<TabConfig>,
    inherit_cwd_from: Option<TabId>,
    default_title: String,
) -> Tab {
    let config = config.unwrap_or_default();
    let tab = Tab::new(config.title.unwrap_or(default_title));
    registry.register_pending(tab.id(), config.cwd.clone());

    let inherit_cwd_from = if config.cwd.is_some() {
        None
    } else {
        inherit_cwd_from
    };
    result.terminals_to_create.push(TerminalSpec {
        tab_id: tab.id(),
        cwd: config.cwd,
        command: config.command,
        env: config.env,
        inherit_cwd_from,
    });
    result.created_tab_id = Some(tab.id());
    tab
}

/// Take a tab out of the layout, collapsing whatever it leaves empty
///
/// The last tab of a panel takes the panel with it; the last panel of a
/// page takes the page with it. Only the window's very last tab is refused.
/// The model is not touched when an error is returned.
pub(super) fn unlink_tab(
    window: &mut Window,
    result: &mut CommandResult,
    tab_id: TabId,
) -> Result<Tab, CommandError> {
    let location = window
        .find_tab(tab_id)
        .ok_or(CommandError::TabNotFound(tab_id))?;
    let tab_count = window
        .panel(location.panel_id)
        .map_or(0, Panel::tab_count);
    let panel_count = window
        .page(location.page_id)
        .map_or(0, |page| page.panel_count());

    if tab_count > 1 {
        let panel = window
            .panel_mut(location.panel_id)
            .ok_or(CommandError::PanelNotFound(location.panel_id))?;
        return Ok(panel.remove_tab(tab_id)?);
    }

    let mut tabs = if panel_count > 1 {
        let page = window
            .page_mut(location.page_id)
            .ok_or(CommandError::PageNotFound(location.page_id))?;
        let panel = page.remove_panel(location.panel_id)?;
        result.removed_panel_ids.push(panel.id());
        result.effects.sync_layout = true;
        panel.into_tabs()
    } else if window.page_count() > 1 {
        let page = window.remove_page(location.page_id)?;
        record_page_removal(result, page.id(), page.panel_ids());
        page.into_panels()
            .into_iter()
            .flat_map(Panel::into_tabs)
            .collect()
    } else {
        return Err(CommandError::CannotCloseLastTab);
    };
    tabs.pop().ok_or(CommandError::TabNotFound(tab_id))
}

/// Take a whole panel out of its page; the last panel of a page takes the page
pub(super) fn unlink_panel(
    window: &mut Window,
    result: &mut CommandResult,
    panel_id: PanelId,
) -> Result<Panel, CommandError> {
    let page_id = window
        .find_panel(panel_id)
        .ok_or(CommandError::PanelNotFound(panel_id))?;
    let panel_count = window.page(page_id).map_or(0, |page| page.panel_count());

    if panel_count > 1 {
        let page = window
            .page_mut(page_id)
            .ok_or(CommandError::PageNotFound(page_id))?;
        let panel = page.remove_panel(panel_id)?;
        result.removed_panel_ids.push(panel_id);
        result.effects.sync_layout = true;
        Ok(panel)
    } else if window.page_count() > 1 {
        let page = window.remove_page(page_id)?;
        record_page_removal(result, page_id, page.panel_ids());
        page.into_panels()
            .pop()
            .ok_or(CommandError::PanelNotFound(panel_id))
    } else {
        Err(CommandError::CannotCloseLastPanel)
    }
}

/// Remove a page and close every terminal on it
pub(super) fn close_page(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    result: &mut CommandResult,
    page_id: PageId,
) -> Result<(), CommandError> {
    let page = window.remove_page(page_id)?;
    record_page_removal(result, page_id, page.panel_ids());
    for panel in page.into_panels() {
        close_panel(registry, result, panel);
    }
    Ok(())
}

fn record_page_removal(result: &mut CommandResult, page_id: PageId, panel_ids: Vec<PanelId>) {
    result.removed_page_ids.push(page_id);
    result.removed_panel_ids.extend(panel_ids);
    result.effects.sync_layout = true;
}

/// Dispose of a tab that leaves for good
pub(super) fn close_tab(
    registry: &mut WorkingDirectoryRegistry,
    result: &mut CommandResult,
    tab: Tab,
) {
    registry.remove(tab.id());
    if let Some(terminal_id) = tab.terminal_id() {
        result.terminals_to_close.push(terminal_id);
    }
}

pub(super) fn close_panel(
    registry: &mut WorkingDirectoryRegistry,
    result: &mut CommandResult,
    panel: Panel,
) {
    for tab in panel.into_tabs() {
        close_tab(registry, result, tab);
    }
}
