//! Shared helpers for the scaffold's test binaries.

pub mod logging;
