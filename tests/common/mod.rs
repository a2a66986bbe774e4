//! Shared test infrastructure: in-memory harness + fixtures.

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

pub use harness::TestHarness;
