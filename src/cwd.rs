//! Per-tab working directory tracking.
//!
//! Three sources disagree about where a tab "is": the path the shell last
//! reported, the path found by inspecting the process, and a path recorded
//! while no terminal exists (before creation, or while the terminal is in
//! transit between pools). The registry owns the state machine that decides
//! which one is authoritative.

use crate::ids::{TabId, TerminalId};
use crate::pool::TerminalPool;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a tab's working directory comes from right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingDirectoryState {
    /// A live terminal exists; `cached_path` is the last value seen for it
    Active {
        terminal_id: TerminalId,
        cached_path: Option<PathBuf>,
    },
    /// No terminal yet (or creation failed); create it here
    Pending { requested_path: Option<PathBuf> },
    /// The terminal was lifted out of its pool
    Detached { captured_path: Option<PathBuf> },
}

impl WorkingDirectoryState {
    /// Best path recorded in the state itself, without asking a pool
    pub fn recorded_path(&self) -> Option<&Path> {
        match self {
            Self::Active { cached_path, .. } => cached_path.as_deref(),
            Self::Pending { requested_path } => requested_path.as_deref(),
            Self::Detached { captured_path } => captured_path.as_deref(),
        }
    }

    pub fn terminal_id(&self) -> Option<TerminalId> {
        match self {
            Self::Active { terminal_id, .. } => Some(*terminal_id),
            _ => None,
        }
    }
}

/// Read access to the working-directory sources a pool exposes
pub trait CwdSource {
    /// Path reported by the shell (OSC 7)
    fn cached_cwd(&self, id: TerminalId) -> Option<PathBuf>;
    /// Path from OS process inspection
    fn process_cwd(&self, id: TerminalId) -> Option<PathBuf>;
}

impl<T: TerminalPool + ?Sized> CwdSource for T {
    fn cached_cwd(&self, id: TerminalId) -> Option<PathBuf> {
        self.get_cached_cwd(id)
    }

    fn process_cwd(&self, id: TerminalId) -> Option<PathBuf> {
        self.get_cwd(id)
    }
}

/// A source with nothing to say, for queries made while no pool is installed
pub struct NoCwdSource;

impl CwdSource for NoCwdSource {
    fn cached_cwd(&self, _id: TerminalId) -> Option<PathBuf> {
        None
    }

    fn process_cwd(&self, _id: TerminalId) -> Option<PathBuf> {
        None
    }
}

/// Registry states captured before the whole pool is swapped
#[derive(Debug, Clone, Default)]
pub struct PoolTransitionSnapshot {
    entries: Vec<(TabId, Option<TerminalId>, Option<PathBuf>)>,
}

impl PoolTransitionSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owner of every tab's `WorkingDirectoryState`
///
/// Each registered tab is in exactly one state; states only change through
/// the methods below.
#[derive(Debug, Clone)]
pub struct WorkingDirectoryRegistry {
    states: HashMap<TabId, WorkingDirectoryState>,
    home: PathBuf,
}

impl WorkingDirectoryRegistry {
    /// Create a registry whose last-resort answer is `home`
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            states: HashMap::new(),
            home: home.into(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn state(&self, tab_id: TabId) -> Option<&WorkingDirectoryState> {
        self.states.get(&tab_id)
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.states.contains_key(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Resolve a tab's working directory; never fails
    ///
    /// With a live terminal the shell-reported path wins over process
    /// inspection. Without one (or when both are silent) the recorded state
    /// path is used, and the home directory is the final fallback.
    pub fn query<S: CwdSource + ?Sized>(
        &self,
        tab_id: TabId,
        terminal_id: Option<TerminalId>,
        source: &S,
    ) -> PathBuf {
        let terminal_id =
            terminal_id.or_else(|| self.states.get(&tab_id).and_then(|s| s.terminal_id()));
        if let Some(id) = terminal_id
            && let Some(path) = source.cached_cwd(id).or_else(|| source.process_cwd(id))
        {
            return path;
        }
        self.best_known_path(tab_id)
    }

    /// Path recorded for a tab, or home
    pub fn best_known_path(&self, tab_id: TabId) -> PathBuf {
        self.states
            .get(&tab_id)
            .and_then(WorkingDirectoryState::recorded_path)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.home.clone())
    }

    /// Record that a tab is waiting for a terminal in `path`
    pub fn register_pending(&mut self, tab_id: TabId, path: Option<PathBuf>) {
        self.states.insert(
            tab_id,
            WorkingDirectoryState::Pending {
                requested_path: path,
            },
        );
    }

    /// Record a live terminal for a tab, whatever the previous state
    pub fn register_active(
        &mut self,
        tab_id: TabId,
        terminal_id: TerminalId,
        path: Option<PathBuf>,
    ) {
        self.states.insert(
            tab_id,
            WorkingDirectoryState::Active {
                terminal_id,
                cached_path: path,
            },
        );
    }

    /// Terminal creation succeeded: Pending becomes Active
    ///
    /// The requested path is kept as the cached path until the terminal
    /// reports its own. Returns false if the tab was not Pending.
    pub fn promote_pending(&mut self, tab_id: TabId, terminal_id: TerminalId) -> bool {
        match self.states.get(&tab_id) {
            Some(WorkingDirectoryState::Pending { requested_path }) => {
                let cached_path = requested_path.clone();
                self.states.insert(
                    tab_id,
                    WorkingDirectoryState::Active {
                        terminal_id,
                        cached_path,
                    },
                );
                true
            }
            _ => false,
        }
    }

    /// Terminal creation failed: keep (or become) Pending so it can be retried
    pub fn retain_pending(&mut self, tab_id: TabId) {
        let path = self.best_known_path_opt(tab_id);
        self.states.insert(
            tab_id,
            WorkingDirectoryState::Pending {
                requested_path: path,
            },
        );
    }

    /// The tab's terminal was detached; remember where it was
    pub fn mark_detached(&mut self, tab_id: TabId, captured_path: Option<PathBuf>) {
        let captured_path = captured_path.or_else(|| self.best_known_path_opt(tab_id));
        self.states
            .insert(tab_id, WorkingDirectoryState::Detached { captured_path });
    }

    /// Point an Active (or Detached) tab at its terminal's new id after a migration
    pub fn reattach_terminal(&mut self, tab_id: TabId, terminal_id: TerminalId) {
        let cached_path = self.best_known_path_opt(tab_id);
        self.states.insert(
            tab_id,
            WorkingDirectoryState::Active {
                terminal_id,
                cached_path,
            },
        );
    }

    /// Copy the source's latest answer into an Active tab's cached path
    pub fn refresh<S: CwdSource + ?Sized>(&mut self, tab_id: TabId, source: &S) {
        if let Some(WorkingDirectoryState::Active {
            terminal_id,
            cached_path,
        }) = self.states.get_mut(&tab_id)
            && let Some(path) = source
                .cached_cwd(*terminal_id)
                .or_else(|| source.process_cwd(*terminal_id))
        {
            *cached_path = Some(path);
        }
    }

    /// The shell in `terminal_id` reported a new directory
    ///
    /// Returns the tab that owns the terminal, if any.
    pub fn update_reported(&mut self, terminal_id: TerminalId, path: PathBuf) -> Option<TabId> {
        self.states.iter_mut().find_map(|(tab_id, state)| match state {
            WorkingDirectoryState::Active {
                terminal_id: id,
                cached_path,
            } if *id == terminal_id => {
                *cached_path = Some(path.clone());
                Some(*tab_id)
            }
            _ => None,
        })
    }

    /// Forget a tab entirely (the tab was closed)
    pub fn remove(&mut self, tab_id: TabId) -> Option<WorkingDirectoryState> {
        self.states.remove(&tab_id)
    }

    /// Snapshot every Active tab before the whole pool is replaced
    ///
    /// Paths are refreshed from `source` (the outgoing pool) first and each
    /// captured tab moves to Detached.
    pub fn capture_before_pool_transition<S: CwdSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> PoolTransitionSnapshot {
        let mut entries = Vec::new();
        for (tab_id, state) in self.states.iter_mut() {
            if let WorkingDirectoryState::Active {
                terminal_id,
                cached_path,
            } = state
            {
                let path = source
                    .cached_cwd(*terminal_id)
                    .or_else(|| source.process_cwd(*terminal_id))
                    .or_else(|| cached_path.clone());
                entries.push((*tab_id, Some(*terminal_id), path.clone()));
                *state = WorkingDirectoryState::Detached {
                    captured_path: path,
                };
            }
        }
        log::debug!("Captured {} working directories before pool swap", entries.len());
        PoolTransitionSnapshot { entries }
    }

    /// Rebind snapshot entries using the old → new terminal id mapping
    ///
    /// Tabs whose terminal did not make it across become Pending at their
    /// captured path so they get a fresh terminal there.
    pub fn restore_after_pool_transition(
        &mut self,
        snapshot: PoolTransitionSnapshot,
        mapping: &HashMap<TerminalId, TerminalId>,
    ) -> Vec<TabId> {
        let mut unmapped = Vec::new();
        for (tab_id, old_id, path) in snapshot.entries {
            if !self.states.contains_key(&tab_id) {
                // Tab closed while the swap was in flight
                continue;
            }
            match old_id.and_then(|old| mapping.get(&old)) {
                Some(new_id) => {
                    self.states.insert(
                        tab_id,
                        WorkingDirectoryState::Active {
                            terminal_id: *new_id,
                            cached_path: path,
                        },
                    );
                }
                None => {
                    self.states.insert(
                        tab_id,
                        WorkingDirectoryState::Pending {
                            requested_path: path,
                        },
                    );
                    unmapped.push(tab_id);
                }
            }
        }
        unmapped
    }

    fn best_known_path_opt(&self, tab_id: TabId) -> Option<PathBuf> {
        self.states
            .get(&tab_id)
            .and_then(WorkingDirectoryState::recorded_path)
            .map(Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::MemoryTerminalPool;

    struct FixedSource {
        cached: Option<PathBuf>,
        process: Option<PathBuf>,
    }

    impl CwdSource for FixedSource {
        fn cached_cwd(&self, _id: TerminalId) -> Option<PathBuf> {
            self.cached.clone()
        }

        fn process_cwd(&self, _id: TerminalId) -> Option<PathBuf> {
            self.process.clone()
        }
    }

    fn registry() -> WorkingDirectoryRegistry {
        WorkingDirectoryRegistry::new("/home/user")
    }

    #[test]
    fn test_query_prefers_shell_reported_path() {
        let mut reg = registry();
        let tab = TabId::new();
        reg.register_active(tab, TerminalId(1), Some("/recorded".into()));
        let source = FixedSource {
            cached: Some("/reported".into()),
            process: Some("/process".into()),
        };
        assert_eq!(reg.query(tab, None, &source), PathBuf::from("/reported"));

        let source = FixedSource {
            cached: None,
            process: Some("/process".into()),
        };
        assert_eq!(reg.query(tab, None, &source), PathBuf::from("/process"));

        let silent = FixedSource {
            cached: None,
            process: None,
        };
        assert_eq!(reg.query(tab, None, &silent), PathBuf::from("/recorded"));
    }

    #[test]
    fn test_query_falls_back_to_home() {
        let reg = registry();
        assert_eq!(
            reg.query(TabId::new(), Some(TerminalId(5)), &NoCwdSource),
            PathBuf::from("/home/user")
        );
    }

    #[test]
    fn test_pending_promote_and_retain() {
        let mut reg = registry();
        let tab = TabId::new();
        reg.register_pending(tab, Some("/tmp".into()));
        assert!(reg.promote_pending(tab, TerminalId(7)));
        assert_eq!(
            reg.state(tab),
            Some(&WorkingDirectoryState::Active {
                terminal_id: TerminalId(7),
                cached_path: Some("/tmp".into()),
            })
        );
        // Already Active: promotion is not a valid transition
        assert!(!reg.promote_pending(tab, TerminalId(8)));

        let other = TabId::new();
        reg.register_pending(other, Some("/var".into()));
        reg.retain_pending(other);
        assert_eq!(
            reg.state(other),
            Some(&WorkingDirectoryState::Pending {
                requested_path: Some("/var".into())
            })
        );
    }

    #[test]
    fn test_detach_then_reattach() {
        let mut reg = registry();
        let tab = TabId::new();
        reg.register_active(tab, TerminalId(1), Some("/a".into()));
        reg.mark_detached(tab, None);
        assert_eq!(reg.best_known_path(tab), PathBuf::from("/a"));
        reg.reattach_terminal(tab, TerminalId(40));
        assert_eq!(reg.state(tab).and_then(|s| s.terminal_id()), Some(TerminalId(40)));
        assert_eq!(reg.best_known_path(tab), PathBuf::from("/a"));
    }

    #[test]
    fn test_pool_transition_round_trip() {
        let mut pool = MemoryTerminalPool::new();
        let moved = pool.create_terminal(80, 24, "sh", Some(Path::new("/one")), &[]).unwrap();
        let lost = pool.create_terminal(80, 24, "sh", Some(Path::new("/two")), &[]).unwrap();

        let mut reg = registry();
        let tab_a = TabId::new();
        let tab_b = TabId::new();
        let tab_pending = TabId::new();
        reg.register_active(tab_a, moved, None);
        reg.register_active(tab_b, lost, None);
        reg.register_pending(tab_pending, Some("/later".into()));

        let snapshot = reg.capture_before_pool_transition(&pool);
        assert_eq!(snapshot.len(), 2);
        assert!(matches!(
            reg.state(tab_a),
            Some(WorkingDirectoryState::Detached { .. })
        ));

        let mapping = HashMap::from([(moved, TerminalId(100))]);
        let unmapped = reg.restore_after_pool_transition(snapshot, &mapping);

        assert_eq!(unmapped, vec![tab_b]);
        assert_eq!(
            reg.state(tab_a),
            Some(&WorkingDirectoryState::Active {
                terminal_id: TerminalId(100),
                cached_path: Some("/one".into()),
            })
        );
        assert_eq!(
            reg.state(tab_b),
            Some(&WorkingDirectoryState::Pending {
                requested_path: Some("/two".into())
            })
        );
        assert_eq!(reg.best_known_path(tab_pending), PathBuf::from("/later"));
    }

    #[test]
    fn test_update_reported_finds_owner() {
        let mut reg = registry();
        let tab = TabId::new();
        reg.register_active(tab, TerminalId(3), None);
        assert_eq!(reg.update_reported(TerminalId(3), "/srv".into()), Some(tab));
        assert_eq!(reg.update_reported(TerminalId(9), "/x".into()), None);
        assert_eq!(reg.best_known_path(tab), PathBuf::from("/srv"));
    }
}
