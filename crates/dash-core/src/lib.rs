//! # dash-core
//!
//! Core object model for studydash.
//!
//! This crate provides the types shared across all studydash crates:
//! - The `Study` configuration graph (settings, sources, posts, images)
//! - The derived `Game` session object and its deterministic simulation
//! - Asset addressing: deterministic paths for binary content and the `AssetBatch` unit
//! - `StructuralDiff`, a per-entity structural equality that reports differing field paths
//! - Cross-cutting error types

pub mod asset;
pub mod diff;
pub mod entities;
pub mod enums;
pub mod errors;
#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;
pub mod simulate;

pub use asset::{Asset, AssetBatch, asset_path};
pub use diff::StructuralDiff;
pub use errors::{ModelError, SimulationError};
pub use simulate::simulate;
