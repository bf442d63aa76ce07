// Library exports for the termdeck binary, tests, and embedding front-ends
//
// # Mutex Usage Policy
//
// The model is single-owner: each window's `Coordinator` is driven from one
// thread and needs no locks. Locks appear only at the edges:
//
//   - `parking_lot::Mutex`    : sync-only shared state: the session file's
//                               read-modify-write cycle, the debug log file,
//                               the pending render flag, and pools shared
//                               with a front-end as `Arc<Mutex<P>>`.
//
//   - `tokio` tasks           : only the render debounce timer. It never holds
//                               a lock across an `.await`.

/// Application version (root crate version).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod debug;

pub mod cli;
pub mod command;
pub mod coordinator;
pub mod cwd;
pub mod drop_intent;
pub mod events;
pub mod ids;
pub mod layout;
pub mod migration;
pub mod model;
pub mod pool;
pub mod render;
pub mod session;
pub mod window_manager;
