//! Integration test crate for SilkCam.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple silk crates to verify they work together.

#[cfg(test)]
mod engine;

#[cfg(test)]
mod pipeline;
