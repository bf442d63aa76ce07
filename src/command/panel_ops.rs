//! Panel commands.

use super::execute::{
    close_panel, focus_panel, new_tab, next_tab_title, resolve_panel, unlink_panel, unlink_tab,
};
use super::result::{CommandError, CommandResult, Effects};
use super::{PanelCommand, TabConfig};
use crate::cwd::WorkingDirectoryRegistry;
use crate::ids::{PageId, PanelId, TabId};
use crate::layout::{Edge, LayoutPath};
use crate::model::{Panel, Window};

pub(super) fn run(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    command: PanelCommand,
) -> Result<CommandResult, CommandError> {
    match command {
        PanelCommand::Split {
            panel_id,
            edge,
            config,
        } => split(window, registry, panel_id, edge, config),
        PanelCommand::Close { panel_id } => {
            let mut result = structural();
            let panel = unlink_panel(window, &mut result, panel_id)?;
            close_panel(registry, &mut result, panel);
            Ok(result)
        }
        PanelCommand::SetActive { panel_id } => {
            let page_id = window
                .find_panel(panel_id)
                .ok_or(CommandError::PanelNotFound(panel_id))?;
            let mut result = CommandResult::ok();
            result.effects = Effects::selection();
            result.effects.sync_layout = focus_panel(window, page_id, panel_id);
            Ok(result)
        }
        PanelCommand::SetRatio {
            page_id,
            path,
            ratio,
        } => set_ratio(window, page_id, &path, ratio),
        PanelCommand::MoveInLayout {
            source,
            target,
            edge,
        } => move_in_layout(window, source, target, edge),
        PanelCommand::SplitWithTab {
            tab_id,
            target,
            edge,
        } => split_with_tab(window, tab_id, target, edge),
    }
}

fn structural() -> CommandResult {
    CommandResult {
        effects: Effects::structural(),
        ..CommandResult::ok()
    }
}

fn split(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    panel_id: Option<PanelId>,
    edge: Edge,
    config: Option<TabConfig>,
) -> Result<CommandResult, CommandError> {
    let (page_id, target) = resolve_panel(window, panel_id)?;
    let inherit_from = window.panel(target).map(|p| p.active_tab_id());
    let title = next_tab_title(window);

    let mut result = structural();
    let tab = new_tab(registry, &mut result, config, inherit_from, title);
    let tab_id = tab.id();
    let page = window
        .page_mut(page_id)
        .ok_or(CommandError::PageNotFound(page_id))?;
    let new_panel_id = match page.split_panel(target, edge, Panel::new(tab)) {
        Ok(id) => id,
        Err(err) => {
            registry.remove(tab_id);
            return Err(err.into());
        }
    };
    window.set_active_page(page_id);
    result.created_panel_id = Some(new_panel_id);
    Ok(result)
}

fn set_ratio(
    window: &mut Window,
    page_id: Option<PageId>,
    path: &LayoutPath,
    ratio: f32,
) -> Result<CommandResult, CommandError> {
    let page = match page_id {
        Some(id) => window.page_mut(id).ok_or(CommandError::PageNotFound(id))?,
        None => window.active_page_mut().ok_or(CommandError::NoActivePage)?,
    };
    let stored = page.set_ratio(path, ratio)?;
    log::trace!("Split at {} now {:.2}", path, stored);

    let mut result = structural();
    result.effects.update_trigger = false;
    Ok(result)
}

fn move_in_layout(
    window: &mut Window,
    source: PanelId,
    target: PanelId,
    edge: Edge,
) -> Result<CommandResult, CommandError> {
    let source_page = window
        .find_panel(source)
        .ok_or(CommandError::PanelNotFound(source))?;
    let target_page = window
        .find_panel(target)
        .ok_or(CommandError::PanelNotFound(target))?;
    if source_page != target_page {
        return Err(CommandError::InvalidMove(source));
    }
    window
        .page_mut(source_page)
        .ok_or(CommandError::PageNotFound(source_page))?
        .move_panel_in_layout(source, target, edge)?;
    window.set_active_page(source_page);
    Ok(structural())
}

/// Give a tab its own panel next to `target`
///
/// A tab that is alone in its panel on the same page just has its panel
/// relocated, so the panel id and terminal binding stay put.
fn split_with_tab(
    window: &mut Window,
    tab_id: TabId,
    target: PanelId,
    edge: Edge,
) -> Result<CommandResult, CommandError> {
    let location = window
        .find_tab(tab_id)
        .ok_or(CommandError::TabNotFound(tab_id))?;
    let target_page = window
        .find_panel(target)
        .ok_or(CommandError::PanelNotFound(target))?;
    let alone = window
        .panel(location.panel_id)
        .is_some_and(|p| p.tab_count() == 1);

    if alone {
        if location.panel_id == target {
            return Err(CommandError::InvalidMove(target));
        }
        if location.page_id == target_page {
            return move_in_layout(window, location.panel_id, target, edge);
        }
    }

    let mut result = structural();
    let tab = unlink_tab(window, &mut result, tab_id)?;
    let panel = Panel::new(tab);
    let new_panel_id = panel.id();
    window
        .page_mut(target_page)
        .ok_or(CommandError::PageNotFound(target_page))?
        .split_panel(target, edge, panel)?;
    window.set_active_page(target_page);
    result.created_panel_id = Some(new_panel_id);
    Ok(result)
}
