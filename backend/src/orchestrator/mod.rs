//! Orchestrator - the per-session event loop
//!
//! See `scheduler.rs` for the phase walk and `config.rs` for every tunable.

pub mod chatter;
pub mod config;
pub mod scheduler;

// Re-export main types for convenience
pub use config::{ChatterConfig, ConfigError, ScalingConfig, SimulatorConfig, TimingConfig};
pub use scheduler::{EventScheduler, SchedulerError, SessionOutcome, SessionReport};
