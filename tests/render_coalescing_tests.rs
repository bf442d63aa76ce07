//! Render requests from structural changes are debounced; input and search
//! render at once.

mod common;

use common::{HOME, Recorder, shared_pool};
use std::time::Duration;
use termdeck::coordinator::{Coordinator, CoordinatorSettings};
use termdeck::cwd::WorkingDirectoryRegistry;
use termdeck::model::Window;

const DEBOUNCE: Duration = Duration::from_millis(16);

fn debounced_coordinator(recorder: &std::sync::Arc<Recorder>) -> Coordinator {
    Coordinator::new(
        Window::with_single_tab("Tab 1"),
        WorkingDirectoryRegistry::new(HOME),
        Box::new(shared_pool(1)),
        recorder.collaborators(),
        CoordinatorSettings {
            render_debounce: DEBOUNCE,
            ..CoordinatorSettings::default()
        },
    )
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_commands_renders_once() {
    let recorder = Recorder::new();
    let mut coordinator = debounced_coordinator(&recorder);

    for _ in 0..4 {
        coordinator.add_tab();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(recorder.renders(), 0);
    assert!(coordinator.scheduler().has_pending());

    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(recorder.renders(), 1);
    assert!(!coordinator.scheduler().has_pending());
}

#[tokio::test(start_paused = true)]
async fn test_input_renders_immediately_and_absorbs_pending() {
    let recorder = Recorder::new();
    let mut coordinator = debounced_coordinator(&recorder);
    coordinator.add_tab();
    assert_eq!(recorder.renders(), 0);

    assert!(coordinator.write_input(b"ls\n"));
    assert_eq!(recorder.renders(), 1);

    tokio::time::sleep(DEBOUNCE * 4).await;
    assert_eq!(recorder.renders(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_search_renders_immediately() {
    let recorder = Recorder::new();
    let mut coordinator = debounced_coordinator(&recorder);
    tokio::time::sleep(DEBOUNCE * 2).await;
    let settled = recorder.renders();

    coordinator.write_input(b"error: one\nerror: two\n");
    assert_eq!(coordinator.search("error"), 2);
    coordinator.search_next();
    assert_eq!(recorder.renders(), settled + 3);
}

#[test]
fn test_without_runtime_every_request_renders() {
    let recorder = Recorder::new();
    let mut coordinator = debounced_coordinator(&recorder);
    let before = recorder.renders();

    coordinator.add_tab();
    coordinator.add_tab();
    assert_eq!(recorder.renders(), before + 2);
}
