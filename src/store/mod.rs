//! Client-side projection stores
//!
//! Per-view in-memory state merging REST snapshots with pushed events.
//! Each store instance owns its list exclusively; two instances can drift
//! until either reloads.

pub mod messages;
pub mod notifications;

pub use messages::{DayGroup, MessageStore};
pub use notifications::{navigation_target, NavigationTarget, NotificationStore};
