//! Live terminals moving between pools: raw detach/attach, tab moves between
//! windows, and handles buffered for a window whose pool does not exist yet.

mod common;

use common::{HOME, Recorder, active_tab_id, settings, shared_pool, single_tab_window, terminal_of};
use std::path::{Path, PathBuf};
use termdeck::command::{CommandError, TabConfig};
use termdeck::coordinator::{AttachOutcome, Coordinator};
use termdeck::cwd::{WorkingDirectoryRegistry, WorkingDirectoryState};
use termdeck::events::TerminalEvent;
use termdeck::ids::TerminalId;
use termdeck::migration::{move_tab_to_window, release_tab};
use termdeck::model::{Page, Panel, Window};
use termdeck::pool::{DetachedTerminal, MemoryTerminalPool, PoolError, TerminalPool};

#[test]
fn test_detach_then_attach_on_fresh_pool_keeps_state() {
    let mut source = MemoryTerminalPool::new();
    let mut dest = MemoryTerminalPool::new().with_first_id(500);
    let id = source
        .create_terminal(80, 24, "sh", Some(Path::new("/srv")), &[])
        .unwrap();
    source.write_input(id, b"cargo build\n");
    source.set_reported_cwd(id, "/srv/project");
    let before = source.get_cached_cwd(id);

    let handle = source.detach_terminal(id).unwrap();
    assert_eq!(handle.origin_id(), id);
    assert_eq!(handle.cwd(), Some(Path::new("/srv/project")));
    let new_id = dest.attach_terminal(handle).map_err(|(e, _)| e).unwrap();

    assert_eq!(dest.get_cached_cwd(new_id), before);
    assert_eq!(dest.scrollback(new_id), Some("cargo build\n"));
    assert!(!source.contains(id));
    assert!(!source.close_terminal(id));
    assert!(source.get_cwd(id).is_none());
}

#[test]
fn test_foreign_handle_is_handed_back() {
    let mut pool = MemoryTerminalPool::new();
    let handle = DetachedTerminal::new(TerminalId(9), None, String::from("not a memory terminal"));

    let Err((err, handle)) = pool.attach_terminal(handle) else {
        panic!("foreign payload must be rejected");
    };
    assert_eq!(err, PoolError::IncompatibleHandle);
    assert_eq!(handle.origin_id(), TerminalId(9));
    handle.discard();
}

#[test]
fn test_move_tab_carries_live_terminal() {
    let (mut source, source_pool, source_events) = single_tab_window(1);
    let (mut dest, dest_pool, _) = single_tab_window(1000);
    let tab_id = source.add_tab().unwrap();
    let old_terminal = terminal_of(&source, tab_id).unwrap();
    {
        let mut pool = source_pool.lock();
        pool.write_input(old_terminal, b"tail -f log\n");
        pool.set_reported_cwd(old_terminal, "/var/log");
    }

    let outcome = move_tab_to_window(&mut source, &mut dest, tab_id, None, None).unwrap();

    let AttachOutcome::Attached(new_terminal) = outcome else {
        panic!("expected the terminal to be attached, got {outcome:?}");
    };
    assert_eq!(terminal_of(&dest, tab_id), Some(new_terminal));
    assert!(source.window().find_tab(tab_id).is_none());
    assert!(!source_pool.lock().contains(old_terminal));

    let dest_pool = dest_pool.lock();
    assert_eq!(dest_pool.scrollback(new_terminal), Some("tail -f log\n"));
    assert_eq!(dest_pool.creation_count(), 1);
    drop(dest_pool);
    assert_eq!(dest.working_directory(tab_id), PathBuf::from("/var/log"));
    assert!(matches!(
        dest.registry().state(tab_id),
        Some(WorkingDirectoryState::Active { terminal_id, .. }) if *terminal_id == new_terminal
    ));
    assert_eq!(
        source_events.count_events(|e| matches!(e, TerminalEvent::Detached { .. })),
        1
    );
}

#[test]
fn test_tab_without_terminal_is_recreated_in_its_directory() {
    let (mut source, source_pool, _) = single_tab_window(1);
    let (mut dest, dest_pool, _) = single_tab_window(1000);
    source_pool.lock().fail_next_creates(1);
    let tab_id = source
        .add_tab_with_config(None, TabConfig::with_cwd("/opt/data"))
        .unwrap();
    assert!(terminal_of(&source, tab_id).is_none());

    let outcome = move_tab_to_window(&mut source, &mut dest, tab_id, None, None).unwrap();

    assert_eq!(outcome, AttachOutcome::Recreated);
    let terminal = terminal_of(&dest, tab_id).unwrap();
    assert_eq!(dest_pool.lock().get_cwd(terminal), Some(PathBuf::from("/opt/data")));
    assert_eq!(dest_pool.lock().stable_id_of(terminal), Some(tab_id));
}

#[test]
fn test_last_tab_cannot_leave_its_window() {
    let (mut source, source_pool, _) = single_tab_window(1);
    let (mut dest, _, _) = single_tab_window(1000);
    let tab_id = active_tab_id(&source);

    let err = move_tab_to_window(&mut source, &mut dest, tab_id, None, None).unwrap_err();

    assert_eq!(err, CommandError::CannotCloseLastTab);
    assert!(source.window().find_tab(tab_id).is_some());
    assert_eq!(source_pool.lock().terminal_count(), 1);
    assert_eq!(dest.window().tab_count(), 1);
}

#[test]
fn test_handle_waits_for_deferred_pool() {
    let (mut source, _, _) = single_tab_window(1);
    let tab_id = source.add_tab().unwrap();
    // The new tab is the active one
    assert!(source.write_input(b"vim notes.md\n"));

    let released = release_tab(&mut source, tab_id).unwrap();
    let handle = released.handle.unwrap();
    let window = Window::new(Page::new("moved", Panel::new(released.tab)));
    let recorder = Recorder::new();
    let mut dest = Coordinator::deferred(
        window,
        WorkingDirectoryRegistry::new(HOME),
        recorder.collaborators(),
        settings(),
    );

    assert_eq!(dest.accept_detached(tab_id, handle), AttachOutcome::Buffered);
    assert!(matches!(
        dest.registry().state(tab_id),
        Some(WorkingDirectoryState::Detached { .. })
    ));
    assert!(terminal_of(&dest, tab_id).is_none());

    let pool = shared_pool(2000);
    dest.install_pool(Box::new(pool.clone()));

    let attached = terminal_of(&dest, tab_id).unwrap();
    let pool = pool.lock();
    assert_eq!(pool.creation_count(), 0);
    assert_eq!(pool.scrollback(attached), Some("vim notes.md\n"));
    assert_eq!(
        recorder.count_events(|e| matches!(e, TerminalEvent::Attached { .. })),
        1
    );
}
