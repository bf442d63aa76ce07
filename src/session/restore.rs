//! Rebuild windows from session state

use super::{SessionLayoutNode, SessionPage, SessionPanel, SessionWindow};
use crate::cwd::WorkingDirectoryRegistry;
use crate::ids::TabId;
use crate::layout::{LayoutNode, LayoutTree};
use crate::model::{Page, Panel, Tab, Window};
use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Validate a working directory path, falling back to `home` if invalid
pub fn validate_cwd(cwd: Option<&str>, home: &Path) -> PathBuf {
    if let Some(dir) = cwd {
        if Path::new(dir).is_dir() {
            return PathBuf::from(dir);
        }
        log::warn!(
            "Session restore: directory '{}' no longer exists, falling back to home",
            dir
        );
    }
    home.to_path_buf()
}

/// Rebuild a window from its saved form
///
/// Every tab keeps its saved stable id and is registered Pending at its
/// validated directory; no terminal exists until the coordinator
/// materializes the active page. Pages whose layout cannot be rebuilt, or
/// that reuse a tab id already restored, are skipped with a warning and
/// leave nothing in the registry. A window with no usable page is an error.
pub fn restore_window(
    saved: &SessionWindow,
    registry: &mut WorkingDirectoryRegistry,
) -> Result<Window> {
    let home = registry.home().to_path_buf();
    let mut pages = Vec::with_capacity(saved.pages.len());
    let mut seen: HashSet<TabId> = HashSet::new();
    for saved_page in &saved.pages {
        let (page, dirs) = match restore_page(saved_page, &home) {
            Ok(restored) => restored,
            Err(err) => {
                log::warn!(
                    "Session restore: skipping page '{}': {:#}",
                    saved_page.title,
                    err
                );
                continue;
            }
        };
        if let Some((tab_id, _)) = dirs.iter().find(|(tab_id, _)| seen.contains(tab_id)) {
            log::warn!(
                "Session restore: skipping page '{}': tab {} already restored",
                saved_page.title,
                tab_id
            );
            continue;
        }
        for (tab_id, cwd) in dirs {
            seen.insert(tab_id);
            registry.register_pending(tab_id, Some(cwd));
        }
        pages.push(page);
    }

    let mut pages = pages.into_iter();
    let Some(first) = pages.next() else {
        bail!("window {} has no restorable pages", saved.id);
    };
    let mut window = Window::with_id(saved.id, first);
    for page in pages {
        window.add_page(page);
    }

    let active_index = saved.active_page_index.min(window.page_count() - 1);
    let active_id = window.pages()[active_index].id();
    window.set_active_page(active_id);

    log::info!(
        "Restored window {} ({} pages, {} tabs)",
        window.id(),
        window.page_count(),
        window.tab_count()
    );
    Ok(window)
}

/// A rebuilt page plus the directory each of its tabs should start in
type RestoredPage = (Page, Vec<(TabId, PathBuf)>);

fn restore_page(saved: &SessionPage, home: &Path) -> Result<RestoredPage> {
    let mut panels = Vec::with_capacity(saved.layout.panel_count());
    let mut dirs = Vec::new();
    let root = restore_node(&saved.layout, &mut panels, &mut dirs, home)?;
    let layout = LayoutTree::from_root(root).context("layout has duplicate panels")?;
    let page = Page::from_parts(
        saved.id,
        saved.title.clone(),
        layout,
        panels,
        saved.active_panel_id,
    )
    .context("layout does not match its panels")?;
    Ok((page, dirs))
}

fn restore_node(
    node: &SessionLayoutNode,
    panels: &mut Vec<Panel>,
    dirs: &mut Vec<(TabId, PathBuf)>,
    home: &Path,
) -> Result<LayoutNode> {
    match node {
        SessionLayoutNode::Panel(saved) => {
            let panel = restore_panel(saved, dirs, home)?;
            let id = panel.id();
            panels.push(panel);
            Ok(LayoutNode::leaf(id))
        }
        SessionLayoutNode::Split {
            direction,
            ratio,
            first,
            second,
        } => Ok(LayoutNode::split(
            *direction,
            *ratio,
            restore_node(first, panels, dirs, home)?,
            restore_node(second, panels, dirs, home)?,
        )),
    }
}

fn restore_panel(
    saved: &SessionPanel,
    dirs: &mut Vec<(TabId, PathBuf)>,
    home: &Path,
) -> Result<Panel> {
    let mut tabs = saved.tabs.iter().map(|saved_tab| {
        dirs.push((saved_tab.id, validate_cwd(saved_tab.cwd.as_deref(), home)));
        Tab::with_id(saved_tab.id, saved_tab.title.clone())
    });
    let Some(first) = tabs.next() else {
        bail!("panel {} has no tabs", saved.id);
    };
    let mut panel = Panel::with_id(saved.id, first);
    for tab in tabs {
        panel.add_tab(tab);
    }

    let active_index = saved.active_tab_index.min(panel.tab_count() - 1);
    let active_id = panel.tabs()[active_index].id();
    panel.set_active_tab(active_id);
    Ok(panel)
}
