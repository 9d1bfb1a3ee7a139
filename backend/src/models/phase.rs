//! Traffic phases
//!
//! A simulated day is an ordered table of phases. Each phase has a nominal
//! spawn rate (events per second), a duration in seconds and a narrative line
//! shown to the client when the phase begins.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One named stretch of simulated traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficPhase {
    pub name: String,

    /// Nominal events per second, jittered every tick
    pub spawn_rate: f64,

    /// How long the phase runs, measured from phase entry
    pub duration_secs: u64,

    /// Sent as an `info` message when the phase starts
    pub narrative: String,
}

impl TrafficPhase {
    pub fn new(
        name: impl Into<String>,
        spawn_rate: f64,
        duration_secs: u64,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            spawn_rate,
            duration_secs,
            narrative: narrative.into(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// The built-in retail day, compressed into roughly three minutes.
pub fn default_phase_table() -> Vec<TrafficPhase> {
    vec![
        TrafficPhase::new(
            "morning_surge",
            5.0,
            15,
            "Morning rush beginning, coffee and breakfast orders surging",
        ),
        TrafficPhase::new(
            "steady_morning",
            8.0,
            10,
            "Steady morning traffic, office supplies and electronics picking up",
        ),
        TrafficPhase::new(
            "pre_lunch_spike",
            12.0,
            8,
            "Pre-lunch spike, food delivery orders increasing rapidly",
        ),
        TrafficPhase::new(
            "lunch_rush",
            20.0,
            12,
            "Lunch rush hour, maximum load on all systems",
        ),
        TrafficPhase::new(
            "post_lunch",
            15.0,
            10,
            "Post-lunch activity, mix of retail and online orders",
        ),
        TrafficPhase::new(
            "afternoon_surge",
            18.0,
            15,
            "Afternoon surge, home delivery slots filling up",
        ),
        TrafficPhase::new(
            "happy_hour",
            25.0,
            8,
            "Happy hour flash sales driving massive traffic",
        ),
        TrafficPhase::new(
            "evening_peak",
            30.0,
            10,
            "Evening peak, entertainment and dining orders skyrocketing",
        ),
        TrafficPhase::new(
            "prime_time",
            35.0,
            12,
            "Prime time shopping, all categories experiencing high volume",
        ),
        TrafficPhase::new(
            "late_evening",
            22.0,
            10,
            "Late evening deals, last-minute orders before cutoff",
        ),
        TrafficPhase::new(
            "night_steady",
            15.0,
            8,
            "Night shift steady flow, international orders coming in",
        ),
        TrafficPhase::new(
            "midnight_deals",
            28.0,
            10,
            "Midnight flash deals creating temporary surge",
        ),
        TrafficPhase::new(
            "wind_down",
            10.0,
            15,
            "Winding down, preparing for next day cycle",
        ),
        TrafficPhase::new("closing", 5.0, 10, "Final orders of the simulation period"),
    ]
}
