//! Domain models for the event stream simulator

pub mod envelope;
pub mod phase;
pub mod session;

// Re-exports
pub use envelope::{CategoryDraw, Envelope};
pub use phase::{default_phase_table, TrafficPhase};
pub use session::{Entity, SimulationSession};
