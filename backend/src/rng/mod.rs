//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: every random draw a session makes MUST go through this module,
//! one `RngManager` per session.

mod xorshift;

pub use xorshift::RngManager;
