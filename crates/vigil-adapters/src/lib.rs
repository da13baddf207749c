//! Vigil Adapters - Filesystem adapters for vigil.
//!
//! This crate provides adapters for:
//! - Recorded landmark sessions in JSON Lines form
//! - Baseline persistence as a flat JSON file

pub mod baseline;
pub mod jsonl;

pub use baseline::{default_path as default_baseline_path, JsonBaselineStore};
pub use jsonl::{discover_sessions, JsonlSessionSource};
