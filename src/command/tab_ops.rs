//! Tab commands.

use super::execute::{close_tab, focus_panel, new_tab, next_tab_title, resolve_panel, unlink_tab};
use super::result::{CommandError, CommandResult, Effects};
use super::{CloseScope, TabCommand, TabConfig};
use crate::cwd::WorkingDirectoryRegistry;
use crate::ids::{PanelId, TabId};
use crate::model::{Tab, Window};

pub(super) fn run(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    command: TabCommand,
) -> Result<CommandResult, CommandError> {
    match command {
        TabCommand::Switch { tab_id } => switch(window, tab_id),
        TabCommand::Add { panel_id } => add(window, registry, panel_id, None),
        TabCommand::AddWithConfig { panel_id, config } => {
            add(window, registry, panel_id, Some(config))
        }
        TabCommand::Close { panel_id, scope } => close(window, registry, panel_id, scope),
        TabCommand::Remove { tab_id } => remove(window, registry, tab_id),
        TabCommand::Reorder { panel_id, order } => {
            let panel = window
                .panel_mut(panel_id)
                .ok_or(CommandError::PanelNotFound(panel_id))?;
            panel.reorder_tabs(&order)?;
            Ok(with_effects(Effects::membership()))
        }
        TabCommand::Move {
            tab_id,
            to_panel,
            index,
        } => move_tab(window, tab_id, to_panel, index),
        TabCommand::Insert {
            panel_id,
            tab,
            index,
        } => insert(window, registry, panel_id, tab, index),
    }
}

fn with_effects(effects: Effects) -> CommandResult {
    CommandResult {
        effects,
        ..CommandResult::ok()
    }
}

fn switch(window: &mut Window, tab_id: TabId) -> Result<CommandResult, CommandError> {
    let location = window
        .find_tab(tab_id)
        .ok_or(CommandError::TabNotFound(tab_id))?;
    let page_changed = focus_panel(window, location.page_id, location.panel_id);
    if let Some(panel) = window.panel_mut(location.panel_id) {
        panel.set_active_tab(tab_id);
    }

    let mut result = with_effects(Effects::selection());
    result.effects.sync_layout = page_changed;
    Ok(result)
}

fn add(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    panel_id: Option<PanelId>,
    config: Option<TabConfig>,
) -> Result<CommandResult, CommandError> {
    let (page_id, panel_id) = resolve_panel(window, panel_id)?;
    let inherit_from = window.panel(panel_id).map(|p| p.active_tab_id());
    let title = next_tab_title(window);

    let mut result = with_effects(Effects::membership());
    let tab = new_tab(registry, &mut result, config, inherit_from, title);
    result.effects.sync_layout = focus_panel(window, page_id, panel_id);
    window
        .panel_mut(panel_id)
        .ok_or(CommandError::PanelNotFound(panel_id))?
        .add_tab(tab);
    Ok(result)
}

fn close(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    panel_id: PanelId,
    scope: CloseScope<TabId>,
) -> Result<CommandResult, CommandError> {
    let panel = window
        .panel(panel_id)
        .ok_or(CommandError::PanelNotFound(panel_id))?;
    let anchor = match scope {
        CloseScope::Single(id)
        | CloseScope::Others { keep: id }
        | CloseScope::Left { of: id }
        | CloseScope::Right { of: id } => id,
    };
    if !panel.contains_tab(anchor) {
        return Err(CommandError::TabNotFound(anchor));
    }
    let doomed = match scope {
        CloseScope::Single(id) => vec![id],
        CloseScope::Others { keep } => panel.tab_ids_except(keep),
        CloseScope::Left { of } => panel.tab_ids_left_of(of),
        CloseScope::Right { of } => panel.tab_ids_right_of(of),
    };
    if doomed.is_empty() {
        return Ok(CommandResult::ok());
    }

    let mut result = with_effects(Effects::membership());
    for tab_id in doomed {
        // Only a `Single` close can empty the panel, so at most the first
        // iteration cascades or fails, and it fails before mutating
        let tab = unlink_tab(window, &mut result, tab_id)?;
        close_tab(registry, &mut result, tab);
    }
    Ok(result)
}

fn remove(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    tab_id: TabId,
) -> Result<CommandResult, CommandError> {
    let mut result = with_effects(Effects::membership());
    let tab = unlink_tab(window, &mut result, tab_id)?;
    registry.remove(tab_id);
    result.released_tabs.push(tab);
    Ok(result)
}

fn move_tab(
    window: &mut Window,
    tab_id: TabId,
    to_panel: PanelId,
    index: Option<usize>,
) -> Result<CommandResult, CommandError> {
    let location = window
        .find_tab(tab_id)
        .ok_or(CommandError::TabNotFound(tab_id))?;
    if window.panel(to_panel).is_none() {
        return Err(CommandError::PanelNotFound(to_panel));
    }
    let index = index.unwrap_or(usize::MAX);

    if location.panel_id == to_panel {
        window
            .panel_mut(to_panel)
            .ok_or(CommandError::PanelNotFound(to_panel))?
            .move_tab_to(tab_id, index)?;
        return Ok(with_effects(Effects::membership()));
    }

    // The target panel survives the unlink, so this never hits the last-tab guard
    let mut result = with_effects(Effects::membership());
    let tab = unlink_tab(window, &mut result, tab_id)?;
    let page_id = window
        .find_panel(to_panel)
        .ok_or(CommandError::PanelNotFound(to_panel))?;
    if focus_panel(window, page_id, to_panel) {
        result.effects.sync_layout = true;
    }
    window
        .panel_mut(to_panel)
        .ok_or(CommandError::PanelNotFound(to_panel))?
        .insert_tab(tab, index);
    Ok(result)
}

fn insert(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    panel_id: Option<PanelId>,
    tab: Tab,
    index: Option<usize>,
) -> Result<CommandResult, CommandError> {
    let tab_id = tab.id();
    if window.find_tab(tab_id).is_some() {
        return Err(CommandError::DuplicateTab(tab_id));
    }
    let (page_id, panel_id) = resolve_panel(window, panel_id)?;

    if !registry.contains(tab_id) {
        match tab.terminal_id() {
            Some(terminal_id) => registry.register_active(tab_id, terminal_id, None),
            None => registry.register_pending(tab_id, None),
        }
    }

    let mut result = with_effects(Effects::membership());
    result.effects.sync_layout = focus_panel(window, page_id, panel_id);
    window
        .panel_mut(panel_id)
        .ok_or(CommandError::PanelNotFound(panel_id))?
        .insert_tab(tab, index.unwrap_or(usize::MAX));
    result.created_tab_id = Some(tab_id);
    Ok(result)
}
