//! Capture session state from a live window

use super::{SessionLayoutNode, SessionPage, SessionPanel, SessionTab, SessionWindow};
use crate::cwd::{CwdSource, WorkingDirectoryRegistry};
use crate::layout::LayoutNode;
use crate::model::{Page, Panel, Tab, Window};

/// Capture a window's hierarchy, resolving each tab's working directory
///
/// Tabs without a terminal are saved with the directory they are waiting
/// to start in.
pub fn capture_window<S: CwdSource + ?Sized>(
    window: &Window,
    registry: &WorkingDirectoryRegistry,
    source: &S,
) -> SessionWindow {
    let capture_tab = |tab: &Tab| SessionTab {
        id: tab.id(),
        title: tab.title().to_string(),
        cwd: Some(
            registry
                .query(tab.id(), tab.terminal_id(), source)
                .to_string_lossy()
                .to_string(),
        ),
    };

    let pages = window
        .pages()
        .iter()
        .filter_map(|page| capture_page(page, &capture_tab))
        .collect();

    SessionWindow {
        id: window.id(),
        pages,
        active_page_index: window.active_page_index().unwrap_or(0),
    }
}

fn capture_page(page: &Page, capture_tab: &dyn Fn(&Tab) -> SessionTab) -> Option<SessionPage> {
    let layout = capture_node(page, page.layout().root(), capture_tab)?;
    Some(SessionPage {
        id: page.id(),
        title: page.title().to_string(),
        layout,
        active_panel_id: Some(page.active_panel_id()),
    })
}

/// Recursively capture a layout node into a session-serializable form
fn capture_node(
    page: &Page,
    node: &LayoutNode,
    capture_tab: &dyn Fn(&Tab) -> SessionTab,
) -> Option<SessionLayoutNode> {
    match node {
        LayoutNode::Leaf(panel_id) => {
            let panel = page.panel(*panel_id)?;
            Some(SessionLayoutNode::Panel(capture_panel(panel, capture_tab)))
        }
        LayoutNode::Split {
            direction,
            ratio,
            first,
            second,
        } => Some(SessionLayoutNode::Split {
            direction: *direction,
            ratio: *ratio,
            first: Box::new(capture_node(page, first, capture_tab)?),
            second: Box::new(capture_node(page, second, capture_tab)?),
        }),
    }
}

fn capture_panel(panel: &Panel, capture_tab: &dyn Fn(&Tab) -> SessionTab) -> SessionPanel {
    SessionPanel {
        id: panel.id(),
        tabs: panel.tabs().iter().map(capture_tab).collect(),
        active_tab_index: panel.index_of(panel.active_tab_id()).unwrap_or(0),
    }
}
