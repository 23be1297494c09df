//! Test fixtures shared across the gateway crates.
//!
//! Exposed unconditionally (not behind `#[cfg(test)]`) so that
//! `gateway-api`'s `tests/` integration suite can build against
//! [`mocks::FixtureProvider`] from outside this crate.

pub mod mocks;
