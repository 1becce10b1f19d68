//! Step definitions for task board scenarios.

pub mod given;
