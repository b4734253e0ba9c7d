//! Helm v3 side of the migration: the target schema, the mapper onto it, and
//! the storage backends that persist converted records.

pub mod convert;
pub mod paths;
pub mod release;
pub mod storage;

pub use convert::convert_release;
pub use release::{Chart, File, Hook, Info, Maintainer, Metadata, Release, TestRun, TestSuite, Values};
