//! Cosmetic info lines interleaved with the event stream.
//!
//! None of these touch session state beyond reading it.

use crate::models::{Entity, SimulationSession};
use crate::rng::RngManager;

/// Synthetic system telemetry, sent after some phase narratives.
pub fn phase_telemetry(rng: &mut RngManager) -> String {
    match rng.range(0, 5) {
        0 => format!("System load at {}% capacity", rng.range_inclusive(60, 95)),
        1 => format!(
            "Payment gateway response time: {}ms",
            rng.range_inclusive(50, 200)
        ),
        2 => format!(
            "Order processing queue depth: {}",
            rng.range_inclusive(100, 1000)
        ),
        3 => format!("Active sessions: {}", rng.range_inclusive(5000, 50000)),
        _ => format!("Cache hit rate: {}%", rng.range_inclusive(85, 99)),
    }
}

/// Throughput or utilization line, sent occasionally during busy phases.
pub fn throughput_info(
    rng: &mut RngManager,
    phase_spawns: u64,
    session: &SimulationSession,
    jittered_rate: f64,
) -> String {
    match rng.range(0, 3) {
        0 => format!("Processed {} orders in current cycle", phase_spawns),
        1 => format!(
            "Node utilization: Order={}, Payment={}",
            session.capacity(Entity::Order),
            session.capacity(Entity::Payment)
        ),
        _ => format!(
            "Current throughput: {} orders/minute",
            (jittered_rate * 60.0) as u64
        ),
    }
}
