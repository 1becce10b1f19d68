//! Adapter implementations for task board ports.

pub mod memory;
pub mod rest;
