//! # dash-verify
//!
//! Proves a Study is safe to publish, without any network I/O.
//!
//! Stages run in order and the first failure stops the pipeline:
//!
//! 1. `TYPE_CHECK`: schema validation, violations named by field path
//! 2. `ROUNDTRIP_CHECK`: encode, decode, structural diff against the original
//! 3. `COMPLIANCE_CHECK`: the encoded document holds only plain JSON
//! 4. `SIMULATE`: a deterministic play-through builds a [`Game`](dash_core::entities::Game)
//! 5. `SIMULATION_ROUNDTRIP_CHECK`: the simulated Game round-trips too

pub mod error;
pub mod pipeline;
pub mod report;
pub mod stage;

pub use error::VerifyError;
pub use pipeline::{Pipeline, Verified};
pub use report::Report;
pub use stage::Stage;
