//! Implementations of the repository traits.

pub mod health_db;
