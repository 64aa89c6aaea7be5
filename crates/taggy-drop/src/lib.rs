//! Drag-and-drop event model and dropped-path classification for taggy.
//!
//! The operating system reports a drag as a sequence of [`DropEvent`]s.
//! [`DragOverlay`] follows that sequence to drive the drop indicator and
//! yields the dropped paths; [`classify_path`] then tells directories (which
//! get tracked and scanned) from files.
//!
//! # Crate Dependencies
//!
//! ```text
//! taggy-cli ──► taggy-store ──► taggy-scanner ──► taggy-core
//!                           └─► taggy-drop ─────────►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod classify;
mod error;
mod events;
mod overlay;

pub use classify::{FileSystem, PathKind, TokioFileSystem, classify_path};
pub use error::DropError;
pub use events::{DropEvent, DropPaths};
pub use overlay::DragOverlay;
