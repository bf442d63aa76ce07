//! Command-line interface for termdeck.
//!
//! The binary is headless: it inspects a saved session (`show`) or rebuilds
//! it against in-memory terminal pools to verify it restores cleanly
//! (`check`).

use crate::coordinator::Collaborators;
use crate::events::LogEventSink;
use crate::ids::{PanelId, WindowId};
use crate::pool::{MemoryTerminalPool, TerminalPool};
use crate::session::{SessionLayoutNode, SessionState, SessionStore};
use crate::window_manager::WindowManager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use termdeck_config::{Config, LogLevel};

/// termdeck - window/page/panel/tab coordination for a split-pane terminal
#[derive(Debug, Parser)]
#[command(name = "termdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Session file to read instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    pub session: Option<PathBuf>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LogLevel::Off,
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the saved session as a window/page/panel/tab tree
    Show,
    /// Restore the saved session headlessly and report what came up
    Check,
}

/// Load the config named on the command line, or the default one
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn session_path(cli: &Cli, config: &Config) -> PathBuf {
    cli.session.clone().unwrap_or_else(|| config.session_path())
}

/// Run the selected subcommand, writing its report to stdout
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let store = SessionStore::new(session_path(cli, config));
    let Some(state) = store.load()? else {
        println!("No saved session at {}", store.path().display());
        return Ok(());
    };
    let report = match cli.command {
        Commands::Show => describe_session(&state),
        Commands::Check => check_session(config, &state).to_string(),
    };
    print!("{}", report);
    Ok(())
}

/// Indented tree of a saved session; active page/panel/tab marked with `*`
pub fn describe_session(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session saved at {}", state.saved_at);
    for window in &state.windows {
        let _ = writeln!(out, "window {} ({} pages)", window.id, window.pages.len());
        for (index, page) in window.pages.iter().enumerate() {
            let marker = if index == window.active_page_index { "*" } else { " " };
            let _ = writeln!(out, "  {}page \"{}\"", marker, page.title);
            describe_layout(&mut out, &page.layout, page.active_panel_id, 2);
        }
    }
    out
}

fn describe_layout(
    out: &mut String,
    node: &SessionLayoutNode,
    active_panel: Option<PanelId>,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    match node {
        SessionLayoutNode::Split {
            direction,
            ratio,
            first,
            second,
        } => {
            let _ = writeln!(out, "{}split {:?} {:.2}", indent, direction, ratio);
            describe_layout(out, first, active_panel, depth + 1);
            describe_layout(out, second, active_panel, depth + 1);
        }
        SessionLayoutNode::Panel(panel) => {
            let marker = if Some(panel.id) == active_panel { "*" } else { " " };
            let _ = writeln!(out, "{}{}panel {}", indent, marker, panel.id);
            for (index, tab) in panel.tabs.iter().enumerate() {
                let marker = if index == panel.active_tab_index { "*" } else { " " };
                let _ = writeln!(
                    out,
                    "{}  {}tab {} \"{}\" {}",
                    indent,
                    marker,
                    tab.id,
                    tab.title,
                    tab.cwd.as_deref().unwrap_or("~")
                );
            }
        }
    }
}

/// What a headless restore produced for one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCheck {
    pub window_id: WindowId,
    pub pages: usize,
    pub tabs: usize,
    /// Tabs with a live terminal (only the active page is materialized)
    pub terminals: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub saved: usize,
    pub windows: Vec<WindowCheck>,
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Restored {} of {} windows", self.windows.len(), self.saved)?;
        for window in &self.windows {
            writeln!(
                f,
                "window {}: {} pages, {} tabs, {} terminals",
                window.window_id, window.pages, window.tabs, window.terminals
            )?;
        }
        Ok(())
    }
}

/// Rebuild `state` against in-memory pools and count what came up
pub fn check_session(config: &Config, state: &SessionState) -> CheckReport {
    let shell = config.default_shell.clone();
    let mut manager = WindowManager::from_config(
        config,
        Collaborators {
            events: Arc::new(LogEventSink),
            ..Collaborators::default()
        },
        Box::new(move |_: WindowId| -> Box<dyn TerminalPool> {
            Box::new(MemoryTerminalPool::with_shell(shell.clone()))
        }),
    );
    manager.restore_session(state);

    let windows = manager
        .window_ids()
        .iter()
        .filter_map(|id| manager.get(*id))
        .map(|coordinator| {
            let window = coordinator.window();
            WindowCheck {
                window_id: window.id(),
                pages: window.page_count(),
                tabs: window.tab_count(),
                terminals: window.terminal_ids().len(),
            }
        })
        .collect();
    let report = CheckReport {
        saved: state.windows.len(),
        windows,
    };
    manager.shutdown();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PageId, TabId};
    use crate::layout::SplitDirection;
    use crate::session::{SessionPage, SessionPanel, SessionTab, SessionWindow};

    fn saved_tab(title: &str) -> SessionTab {
        SessionTab {
            id: TabId::new(),
            title: title.to_string(),
            cwd: Some("/tmp".to_string()),
        }
    }

    fn saved_state() -> SessionState {
        let left = PanelId::new();
        let page = SessionPage {
            id: PageId::new(),
            title: "work".to_string(),
            layout: SessionLayoutNode::Split {
                direction: SplitDirection::Horizontal,
                ratio: 0.5,
                first: Box::new(SessionLayoutNode::Panel(SessionPanel {
                    id: left,
                    tabs: vec![saved_tab("editor"), saved_tab("build")],
                    active_tab_index: 1,
                })),
                second: Box::new(SessionLayoutNode::Panel(SessionPanel {
                    id: PanelId::new(),
                    tabs: vec![saved_tab("logs")],
                    active_tab_index: 0,
                })),
            },
            active_panel_id: Some(left),
        };
        SessionState::new(vec![SessionWindow {
            id: WindowId::new(),
            pages: vec![page],
            active_page_index: 0,
        }])
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["termdeck", "check", "--log-level", "debug"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
        assert!(matches!(cli.log_level, Some(LogLevelArg::Debug)));
    }

    #[test]
    fn test_describe_marks_active_entries() {
        let text = describe_session(&saved_state());
        assert!(text.contains("*page \"work\""));
        assert!(text.contains("*tab"));
        assert!(text.contains("\"build\""));
        assert!(text.contains("split Horizontal 0.50"));
    }

    #[test]
    fn test_check_materializes_visible_tabs() {
        let report = check_session(&Config::default(), &saved_state());
        assert_eq!(report.saved, 1);
        assert_eq!(report.windows.len(), 1);
        let window = &report.windows[0];
        assert_eq!(window.tabs, 3);
        // Background tabs of the active page are materialized too
        assert_eq!(window.terminals, 3);
    }
}
