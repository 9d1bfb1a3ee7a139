//! Session timing primitives

pub mod time;
