//! # dash-schema
//!
//! JSON Schema registry, JSON codec, and compliance checks for studydash.
//!
//! This crate provides:
//! - `SchemaRegistry`: JSON Schemas for the Study and Game graphs, with
//!   validation that reports violations by dotted field path
//! - `ConfigCodec` / `JsonCodec`: the lossless Study/Game ⇄ JSON conversion
//! - `check_compliance`: a walk over a serialized document that rejects values
//!   which cannot travel as plain JSON
//!
//! ## Architecture
//!
//! Entity types are defined in `dash-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types and provides the registry, codec, and
//! compliance layer. The verification pipeline and the publish orchestrator
//! depend on it for every conversion.

pub mod codec;
pub mod compliance;
pub mod error;
pub mod registry;

pub use codec::{ConfigCodec, JsonCodec};
pub use compliance::check_compliance;
pub use error::{ComplianceError, SchemaError, StructuralError, Violation};
pub use registry::SchemaRegistry;
