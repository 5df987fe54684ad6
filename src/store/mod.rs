//! Record store access.
//!
//! This module reads log records exported from the journal's document
//! store and can watch the export for changes.

pub mod loader;
pub mod watcher;

pub use loader::{filter_user, load_records};
pub use watcher::Subscription;
