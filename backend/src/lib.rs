//! flowProbe Core - synthetic order/payment event stream engine
//!
//! Generates a time-varying stream of order and payment events, modeled on a
//! retail platform's day compressed into about three minutes, for exercising
//! monitoring and visualization tooling.
//!
//! # Architecture
//!
//! - **models**: Domain types (TrafficPhase, SimulationSession, Envelope)
//! - **sampling**: Order/payment category samplers
//! - **scaling**: Capacity controller emitting scale-up/scale-down signals
//! - **orchestrator**: Configuration and the per-session event scheduler
//! - **framing**: SSE framing and the transport sink seam
//! - **core**: Session clock and the ceiling predicate
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Every session starts with `start` and ends with at most one `end`
//! 2. Capacities stay within the configured bounds
//! 3. All randomness is deterministic (one seeded RNG per session)
//! 4. No session outlives its ceiling

// Module declarations
pub mod core;
pub mod framing;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod sampling;
pub mod scaling;

// Re-exports for convenience
pub use crate::core::time::{PhaseExit, SessionClock};
pub use framing::{frame, parse_frame, FrameError, FrameSink, MemorySink, SinkError};
pub use models::{CategoryDraw, Entity, Envelope, SimulationSession, TrafficPhase};
pub use orchestrator::{
    ChatterConfig, ConfigError, EventScheduler, ScalingConfig, SchedulerError, SessionOutcome,
    SessionReport, SimulatorConfig, TimingConfig,
};
pub use rng::RngManager;
pub use sampling::{CategorySampler, SamplingError};
pub use scaling::CapacityController;
