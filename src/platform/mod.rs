//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (epoch milliseconds, ISO and local formatting)
//! - Storage (LocalStorage on web, in-memory elsewhere)
//! - Keyboard shortcuts
//! - Document rendering (print dialog on web)
//! - DOM binding of the live form (web only)

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod input;
pub mod print;
pub mod storage;
pub mod time;

pub use input::Shortcut;
pub use print::DocumentRenderer;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use time::Millis;
