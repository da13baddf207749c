//! Test support utilities for vigil.
//!
//! Provides mocks of the core ports plus synthetic landmark frame and
//! session builders for testing the monitoring pipeline.
//!
//! # Example
//!
//! ```
//! use vigil_test_support::{FrameBuilder, MockLandmarkSource, SessionBuilder};
//!
//! // Eyes open, then a 150 ms closure
//! let open = FrameBuilder::new().eyes(0.3).build();
//! let closed = FrameBuilder::new().eyes(0.05).build();
//! let records = SessionBuilder::new(30.0)
//!     .hold(1.0, &open)
//!     .hold(0.15, &closed)
//!     .hold(1.0, &open)
//!     .build();
//!
//! let source = MockLandmarkSource::new("synthetic", records);
//! ```

mod builders;
mod mocks;

pub use builders::{FrameBuilder, SessionBuilder, HEIGHT, WIDTH};
pub use mocks::{MockBaselineStore, MockLandmarkSource, MockProgressSink, MockResultOutput};
