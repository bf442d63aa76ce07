//! File I/O for session persistence
//!
//! All windows share one YAML file (by default
//! `~/.config/termdeck/last_session.yaml`). Each save replaces the entry of
//! one window and rewrites the file atomically.

use super::{SessionPersistence, SessionState, SessionWindow};
use crate::ids::WindowId;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// Save session state to a specific file
pub fn save_session_to(state: &SessionState, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create session directory {:?}", parent))?;
    }

    let contents = serde_yaml_ng::to_string(state).context("Failed to serialize session state")?;

    // Write to a sibling temp file then rename so a crash never leaves half a file
    let temp_path = path.with_extension("yaml.tmp");
    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write session state to {:?}", temp_path))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move session state into {:?}", path))?;

    log::debug!(
        "Saved session state ({} windows) to {:?}",
        state.windows.len(),
        path
    );
    Ok(())
}

/// Load session state from a specific file
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but is corrupt.
pub fn load_session_from(path: &Path) -> Result<Option<SessionState>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session state from {:?}", path))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let state: SessionState = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse session state from {:?}", path))?;

    log::info!(
        "Loaded session state ({} windows) from {:?}",
        state.windows.len(),
        path
    );
    Ok(Some(state))
}

/// YAML session file shared by every window of the process
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles from different windows
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<SessionState>> {
        let _guard = self.lock.lock();
        load_session_from(&self.path)
    }

    /// Replace the whole file
    pub fn save(&self, state: &SessionState) -> Result<()> {
        let _guard = self.lock.lock();
        save_session_to(state, &self.path)
    }

    /// Replace (or add) one window's entry and restamp the file
    pub fn update_window(&self, window: &SessionWindow) -> Result<()> {
        let _guard = self.lock.lock();
        let mut state = self.load_for_update();
        state.upsert_window(window.clone());
        state.saved_at = chrono::Utc::now().to_rfc3339();
        save_session_to(&state, &self.path)
    }

    /// Drop one window's entry
    pub fn remove_window(&self, window_id: WindowId) -> Result<()> {
        let _guard = self.lock.lock();
        let mut state = self.load_for_update();
        if state.remove_window(window_id) {
            state.saved_at = chrono::Utc::now().to_rfc3339();
            save_session_to(&state, &self.path)?;
        }
        Ok(())
    }

    /// Remove the session file (e.g., after the user chose not to restore)
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session state file {:?}", self.path))?;
        }
        Ok(())
    }

    /// Current contents, or an empty state if the file is missing or unreadable
    fn load_for_update(&self) -> SessionState {
        match load_session_from(&self.path) {
            Ok(Some(state)) => state,
            Ok(None) => SessionState::new(Vec::new()),
            Err(err) => {
                log::warn!("Discarding unreadable session file: {:#}", err);
                SessionState::new(Vec::new())
            }
        }
    }
}

impl SessionPersistence for SessionStore {
    fn save_session(&self, window: &SessionWindow) {
        if let Err(err) = self.update_window(window) {
            log::error!("Failed to save session for window {}: {:#}", window.id, err);
        }
    }

    fn forget_window(&self, window_id: WindowId) {
        if let Err(err) = self.remove_window(window_id) {
            log::error!("Failed to drop window {} from session: {:#}", window_id, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PageId, PanelId, TabId};
    use crate::layout::SplitDirection;
    use crate::session::{SessionLayoutNode, SessionPage, SessionPanel, SessionTab};
    use tempfile::tempdir;

    fn panel(title: &str, cwd: &str) -> SessionLayoutNode {
        SessionLayoutNode::Panel(SessionPanel {
            id: PanelId::new(),
            tabs: vec![SessionTab {
                id: TabId::new(),
                title: title.to_string(),
                cwd: Some(cwd.to_string()),
            }],
            active_tab_index: 0,
        })
    }

    fn sample_window() -> SessionWindow {
        SessionWindow {
            id: WindowId::new(),
            pages: vec![SessionPage {
                id: PageId::new(),
                title: "dev".to_string(),
                layout: SessionLayoutNode::Split {
                    direction: SplitDirection::Vertical,
                    ratio: 0.5,
                    first: Box::new(panel("code", "/home/user/code")),
                    second: Box::new(SessionLayoutNode::Split {
                        direction: SplitDirection::Horizontal,
                        ratio: 0.6,
                        first: Box::new(panel("logs", "/home/user/logs")),
                        second: Box::new(panel("tests", "/home/user/tests")),
                    }),
                },
                active_panel_id: None,
            }],
            active_page_index: 0,
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nonexistent.yaml");
        assert!(load_session_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_empty_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.yaml");
        fs::write(&path, "").unwrap();
        assert!(load_session_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corrupt.yaml");
        fs::write(&path, "not: valid: yaml: [[[").unwrap();
        assert!(load_session_from(&path).is_err());
    }

    #[test]
    fn test_nested_layout_survives_save() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("dir").join("session.yaml");
        let window = sample_window();
        let tab_id = window.pages[0].layout.panels()[1].tabs[0].id;

        save_session_to(&SessionState::new(vec![window]), &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("yaml.tmp").exists());

        let loaded = load_session_from(&path).unwrap().unwrap();
        let layout = &loaded.windows[0].pages[0].layout;
        assert_eq!(layout.panel_count(), 3);
        assert_eq!(layout.panels()[1].tabs[0].id, tab_id);
        match layout {
            SessionLayoutNode::Split {
                direction, ratio, ..
            } => {
                assert_eq!(*direction, SplitDirection::Vertical);
                assert!((ratio - 0.5).abs() < f32::EPSILON);
            }
            SessionLayoutNode::Panel(_) => panic!("Expected Split at root"),
        }
    }

    #[test]
    fn test_store_updates_one_window_at_a_time() {
        let temp = tempdir().unwrap();
        let store = SessionStore::new(temp.path().join("session.yaml"));
        let first = sample_window();
        let mut second = sample_window();

        store.save_session(&first);
        store.save_session(&second);
        second.pages[0].title = "renamed".to_string();
        store.save_session(&second);

        let state = store.load().unwrap().unwrap();
        assert_eq!(state.windows.len(), 2);
        assert_eq!(state.windows[0].id, first.id);
        assert_eq!(state.window(second.id).unwrap().pages[0].title, "renamed");

        store.forget_window(first.id);
        let state = store.load().unwrap().unwrap();
        assert_eq!(state.windows.len(), 1);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_store_recovers_from_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("session.yaml");
        fs::write(&path, "{{{{").unwrap();
        let store = SessionStore::new(&path);
        store.update_window(&sample_window()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().windows.len(), 1);
    }
}
