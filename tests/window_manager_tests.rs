//! Several windows under one manager: drags across windows and shell events.

mod common;

use common::{Recorder, manager_with_pools, terminal_of};
use termdeck::drop_intent::{DropIntent, DropIntentQueue};
use termdeck::events::TerminalEvent;
use termdeck::pool::PoolEvent;

#[test]
fn test_drag_out_opens_window_with_live_terminal() {
    let recorder = Recorder::new();
    let (mut manager, pools) = manager_with_pools(&recorder);
    let window_id = manager.create_window();
    let coordinator = manager.get_mut(window_id).unwrap();
    let tab_id = coordinator.add_tab().unwrap();
    assert!(coordinator.write_input(b"htop\n"));

    let mut queue = DropIntentQueue::new();
    queue.begin_gesture();
    queue.capture(DropIntent::MoveToWindow {
        tab_id,
        to: None,
        target_panel: None,
        index: None,
    });
    assert!(queue.execute(&mut manager).is_empty());
    assert_eq!(manager.len(), 1);

    queue.end_gesture();
    let outcomes = queue.execute(&mut manager);
    assert_eq!(outcomes, vec![Ok(())]);
    assert!(queue.pending().is_empty());

    let new_window = manager.find_tab(tab_id).unwrap();
    assert_ne!(new_window, window_id);
    let terminal = terminal_of(manager.get(new_window).unwrap(), tab_id).unwrap();
    let pools = pools.lock();
    assert_eq!(pools.len(), 2);
    let dest = pools[1].lock();
    assert_eq!(dest.creation_count(), 0);
    assert_eq!(dest.scrollback(terminal), Some("htop\n"));
    assert_eq!(pools[0].lock().terminal_count(), 1);
}

#[test]
fn test_last_shell_exit_closes_its_window() {
    let recorder = Recorder::new();
    let (mut manager, pools) = manager_with_pools(&recorder);
    let doomed = manager.create_window();
    let survivor = manager.create_window();
    let tab_id = manager.get(doomed).unwrap().window().active_tab().unwrap().id();
    let terminal = terminal_of(manager.get(doomed).unwrap(), tab_id).unwrap();

    pools.lock()[0]
        .lock()
        .push_event(PoolEvent::ProcessExited(terminal));

    assert_eq!(manager.handle_pool_events(), vec![doomed]);
    assert_eq!(manager.window_ids(), &[survivor]);
    assert!(!manager.should_exit());
    assert_eq!(recorder.forgotten.lock().as_slice(), &[doomed]);
}

#[test]
fn test_shell_exit_closes_only_that_tab() {
    let recorder = Recorder::new();
    let (mut manager, pools) = manager_with_pools(&recorder);
    let window_id = manager.create_window();
    let coordinator = manager.get_mut(window_id).unwrap();
    let tab_id = coordinator.add_tab().unwrap();
    let terminal = terminal_of(coordinator, tab_id).unwrap();

    pools.lock()[0]
        .lock()
        .push_event(PoolEvent::ProcessExited(terminal));

    assert!(manager.handle_pool_events().is_empty());
    let coordinator = manager.get(window_id).unwrap();
    assert_eq!(coordinator.window().tab_count(), 1);
    assert!(coordinator.window().find_tab(tab_id).is_none());
    assert!(!pools.lock()[0].lock().contains(terminal));
}

#[test]
fn test_bell_on_background_page_flags_attention() {
    let recorder = Recorder::new();
    let (mut manager, pools) = manager_with_pools(&recorder);
    let window_id = manager.create_window();
    let coordinator = manager.get_mut(window_id).unwrap();
    let first_page = coordinator.window().active_page_id();
    let tab_id = coordinator.window().active_tab().unwrap().id();
    let terminal = terminal_of(coordinator, tab_id).unwrap();
    coordinator.new_page(None).unwrap();

    pools.lock()[0].lock().push_event(PoolEvent::Bell(terminal));
    manager.handle_pool_events();

    let window = manager.get(window_id).unwrap().window();
    assert!(window.page(first_page).unwrap().needs_attention());
    assert_eq!(recorder.attention.lock().as_slice(), &[(first_page, true)]);
    let bells = recorder
        .count_events(|e| matches!(e, TerminalEvent::Bell { tab_id: t, .. } if *t == tab_id));
    assert_eq!(bells, 1);
}
