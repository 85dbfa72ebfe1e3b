//! # dash-store
//!
//! The remote store contract studydash publishes through, and its backends.
//!
//! - [`RemoteStore`]: asset upload/delete and study metadata fetch/write/delete
//! - [`HttpStore`]: the dashboard HTTP API (reqwest)
//! - [`BucketStore`]: any `object_store` bucket (in-memory, local directory, S3)
//! - [`ConfiguredStore`]: whichever of the two the configuration selects
//! - [`FaultyStore`]: deterministic fault injection for tests and drills

pub mod adapter;
pub mod bucket;
pub mod configured;
pub mod error;
pub mod faulty;
pub mod http;

pub use adapter::{RemoteStore, StoreCall, document_id};
pub use bucket::BucketStore;
pub use configured::ConfiguredStore;
pub use error::StoreError;
pub use faulty::FaultyStore;
pub use http::HttpStore;
