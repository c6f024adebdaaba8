//! Repository traits consumed by the service layer.

pub mod health;
