//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the monitoring core and the
//! adapters that feed it recorded sessions, persist baselines and render
//! results.

mod baseline_store;
mod landmark_source;
mod progress;
mod result_output;

pub use baseline_store::BaselineStore;
pub use landmark_source::LandmarkSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
