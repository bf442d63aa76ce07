//! Page commands.

use super::execute::{close_page, new_tab, next_tab_title};
use super::result::{CommandError, CommandResult, Effects};
use super::{CloseScope, PageCommand, PageTarget, TabConfig};
use crate::cwd::WorkingDirectoryRegistry;
use crate::ids::PageId;
use crate::model::{Page, Panel, Tab, Window};

pub(super) fn run(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    command: PageCommand,
) -> Result<CommandResult, CommandError> {
    match command {
        PageCommand::Switch(target) => switch(window, target),
        PageCommand::Create { title, config } => create(window, registry, title, config),
        PageCommand::Close(scope) => close(window, registry, scope),
        PageCommand::Reorder { order } => {
            window.reorder_pages(&order)?;
            Ok(with_effects(Effects::membership()))
        }
        PageCommand::Move { page_id, index } => {
            window.move_page_to(page_id, index)?;
            Ok(with_effects(Effects::membership()))
        }
        PageCommand::MoveToEnd { page_id } => {
            window.move_page_to(page_id, usize::MAX)?;
            Ok(with_effects(Effects::membership()))
        }
        PageCommand::Rename { page_id, title } => {
            window
                .page_mut(page_id)
                .ok_or(CommandError::PageNotFound(page_id))?
                .set_title(title);
            Ok(with_effects(Effects::membership()))
        }
    }
}

fn with_effects(effects: Effects) -> CommandResult {
    CommandResult {
        effects,
        ..CommandResult::ok()
    }
}

fn resolve_target(window: &Window, target: PageTarget) -> Result<PageId, CommandError> {
    let count = window.page_count();
    let current = window
        .active_page_index()
        .ok_or(CommandError::NoActivePage)?;
    let index = match target {
        PageTarget::Id(id) => {
            return window
                .page(id)
                .map(Page::id)
                .ok_or(CommandError::PageNotFound(id));
        }
        PageTarget::Index(index) if index < count => index,
        PageTarget::Index(index) => return Err(CommandError::PageIndexOutOfRange(index)),
        PageTarget::Next => (current + 1) % count,
        PageTarget::Previous => (current + count - 1) % count,
    };
    Ok(window.pages()[index].id())
}

fn switch(window: &mut Window, target: PageTarget) -> Result<CommandResult, CommandError> {
    let page_id = resolve_target(window, target)?;
    if page_id == window.active_page_id() {
        return Ok(CommandResult::ok());
    }
    window.set_active_page(page_id);

    let mut result = with_effects(Effects::selection());
    result.effects.sync_layout = true;
    Ok(result)
}

fn create(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    title: Option<String>,
    config: Option<TabConfig>,
) -> Result<CommandResult, CommandError> {
    let inherit_from = window.active_tab().map(Tab::id);
    let tab_title = next_tab_title(window);
    let page_title = title.unwrap_or_else(|| format!("Page {}", window.page_count() + 1));

    let mut result = with_effects(Effects::structural());
    let tab = new_tab(registry, &mut result, config, inherit_from, tab_title);
    let panel = Panel::new(tab);
    let page = Page::new(page_title, panel);
    result.created_panel_id = Some(page.active_panel_id());
    result.created_page_id = Some(page.id());
    window.add_page(page);
    Ok(result)
}

fn close(
    window: &mut Window,
    registry: &mut WorkingDirectoryRegistry,
    scope: CloseScope<PageId>,
) -> Result<CommandResult, CommandError> {
    let anchor = match scope {
        CloseScope::Single(id)
        | CloseScope::Others { keep: id }
        | CloseScope::Left { of: id }
        | CloseScope::Right { of: id } => id,
    };
    if window.page(anchor).is_none() {
        return Err(CommandError::PageNotFound(anchor));
    }
    let doomed = match scope {
        CloseScope::Single(id) => {
            // The last page only goes through `Window::force_remove_page`
            if window.page_count() == 1 {
                return Err(CommandError::CannotCloseLastPage);
            }
            vec![id]
        }
        CloseScope::Others { keep } => window.page_ids_except(keep),
        CloseScope::Left { of } => window.page_ids_left_of(of),
        CloseScope::Right { of } => window.page_ids_right_of(of),
    };
    if doomed.is_empty() {
        return Ok(CommandResult::ok());
    }

    let mut result = with_effects(Effects::structural());
    for page_id in doomed {
        close_page(window, registry, &mut result, page_id)?;
    }
    Ok(result)
}
