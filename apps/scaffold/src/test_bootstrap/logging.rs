#![cfg(test)]

//! Unit-test logging for this crate. Integration tests install the same
//! subscriber from `tests/common`.

/// Idempotent; the level comes from `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init() {
    scaffold_test_support::logging::init();
}
