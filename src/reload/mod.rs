//! Live Reload
//!
//! ```text
//! ChangeWatcher → Coordinator → NotificationHub → ViewerChannel → ViewerConnection → browser
//!  (debounce)     (read+build)     (fan-out)       (bounded queue)    (pump thread)
//! ```
//!
//! # Modules
//!
//! - `channel` - Viewer ids, lifecycle states and the hub-side queue handle
//! - `connection` - Per-viewer WebSocket pump with heartbeat
//! - `coordinator` - Turns a settled change into a broadcast
//! - `hub` - Registry and broadcast
//! - `message` - Wire messages (`reload`, `{"content": ...}`)
//! - `watch` - Debounced single-file watcher

pub mod channel;
pub mod connection;
pub mod coordinator;
pub mod hub;
pub mod message;
pub mod watch;

pub use coordinator::Coordinator;
pub use hub::NotificationHub;
