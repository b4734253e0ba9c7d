//! Helm v2 (`hapi`) wire schema.
//!
//! These types mirror the protobuf messages the legacy release manager
//! persists into the cluster (`hapi.chart.*` and `hapi.release.*`). They are
//! maintained in `prost` derive form rather than generated at build time so
//! the crate builds without `protoc`; field numbers must match the published
//! schema exactly, since they decode payloads written by real Tiller
//! deployments.

pub mod chart;
pub mod release;

pub use chart::{Chart, Config, Maintainer, Metadata, Template};
pub use release::{Hook, Info, Release, Status, TestRun, TestSuite};
