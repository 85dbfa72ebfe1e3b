//! # dash-publish
//!
//! Sequences verification, asset upload and the metadata write, and provides
//! the other study lifecycle operations against a remote store.
//!
//! Publishing aborts at the first failing step:
//!
//! 1. verification fails: nothing reaches the store;
//! 2. the asset batch fails: uploaded assets are left in place and no
//!    metadata is written;
//! 3. the metadata write fails: the assets exist remotely without matching
//!    metadata, reported as [`PublishError::Metadata`].

pub mod entry;
pub mod error;
pub mod publisher;

pub use entry::{ResultEntry, StudyEntry};
pub use error::PublishError;
pub use publisher::{EnabledState, Published, Publisher, referenced_paths};
