//! # taggy-store
//!
//! State core of the taggy audio tag editor.
//!
//! ```text
//!                    ┌──────────────── Store ────────────────┐
//!  ScanBackend ────► │ LibraryState                          │ ◄──── DropEvent
//!  TagBackend  ◄───► │   Registry ──┐                        │
//!  KeyValueStore ◄── │   DirectoryTracker ──► derive_visible │ ────► visible_files / query
//!                    │   Selection, Preferences, overlay     │
//!                    └───────────────────────────────────────┘
//! ```
//!
//! [`Store`] is the cloneable handle the presentation layer talks to.
//! Everything it does is a synchronous mutation of [`LibraryState`] between
//! awaits on the backends, so concurrent scans never corrupt each other.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod notify;
mod persist;
mod picker;
pub mod query;
mod registry;
mod selection;
mod state;
mod store;
mod tracker;
mod view;

pub use error::StoreError;
pub use notify::{NOTIFICATION_TTL, Notification, NotificationLevel, Notifications};
pub use persist::PreferenceSync;
pub use picker::DirectoryPicker;
pub use registry::Registry;
pub use selection::Selection;
pub use state::{LibraryState, ScanProgress};
pub use store::{DropAction, DropOutcome, ScanResults, ScanSummary, Store, StoreBuilder};
pub use tracker::{DirectoryEntry, DirectoryTracker, Generation, ScanTicket};
pub use view::derive_visible;
