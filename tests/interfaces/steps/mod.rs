//! Cucumber step definitions for interface tests.

pub mod method_logging;
