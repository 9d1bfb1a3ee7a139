//! Simulator configuration
//!
//! Every tunable of a session lives here: timing, scaling thresholds and
//! probabilities, chatter probabilities, the phase table and both category
//! tables. Configuration is loaded once at startup (usually from TOML),
//! validated, and then shared read-only by every session.
//!
//! # Example TOML
//!
//! ```toml
//! seed = 42
//!
//! [timing]
//! ceiling_secs = 180
//! tick_ms = 1000
//!
//! [scaling]
//! min_capacity = 1
//! max_capacity = 12
//! scale_up_threshold = 15.0
//!
//! [[phases]]
//! name = "lunch_rush"
//! spawn_rate = 20.0
//! duration_secs = 12
//! narrative = "Lunch rush hour, maximum load on all systems"
//! ```
//!
//! Omitted sections and fields fall back to the defaults below; an omitted
//! `phases` array means the built-in retail day.

use crate::models::phase::{default_phase_table, TrafficPhase};
use crate::models::Entity;
use crate::sampling::{CategorySampler, SamplingError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("phase table is empty")]
    EmptyPhaseTable,

    #[error("phase {index} ({name:?}): {reason}")]
    InvalidPhase {
        index: usize,
        name: String,
        reason: &'static str,
    },

    #[error("capacity bounds invalid: min {min}, max {max} (need 1 <= min <= max)")]
    InvalidCapacityBounds { min: u32, max: u32 },

    #[error("initial {entity} capacity {value} outside [{min}, {max}]")]
    InitialCapacityOutOfRange {
        entity: Entity,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{field} must be a probability in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("jitter range [{min}, {max}) invalid")]
    InvalidJitter { min: f64, max: f64 },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{table} categories: {source}")]
    Categories {
        table: &'static str,
        #[source]
        source: SamplingError,
    },
}

/// Session timing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Hard wall-clock cutoff for a whole session
    pub ceiling_secs: u64,

    /// Scheduling tick between spawn bursts
    pub tick_ms: u64,

    /// Pause after each scaling signal
    pub scale_pause_ms: u64,

    /// Pause inserted after every `spawn_pause_every` spawns
    pub spawn_pause_ms: u64,
    pub spawn_pause_every: u64,

    /// Per-tick rate multiplier is drawn from [jitter_min, jitter_max)
    pub jitter_min: f64,
    pub jitter_max: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            ceiling_secs: 180,
            tick_ms: 1000,
            scale_pause_ms: 100,
            spawn_pause_ms: 10,
            spawn_pause_every: 50,
            jitter_min: 0.7,
            jitter_max: 1.3,
        }
    }
}

impl TimingConfig {
    pub fn ceiling(&self) -> Duration {
        Duration::from_secs(self.ceiling_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn scale_pause(&self) -> Duration {
        Duration::from_millis(self.scale_pause_ms)
    }

    pub fn spawn_pause(&self) -> Duration {
        Duration::from_millis(self.spawn_pause_ms)
    }
}

/// Capacity controller parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScalingConfig {
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub initial_order_capacity: u32,
    pub initial_payment_capacity: u32,

    /// Nominal rate above which scale-up is considered
    pub scale_up_threshold: f64,

    /// Nominal rate below which scale-down is considered
    pub scale_down_threshold: f64,

    pub scale_up_probability: f64,
    pub scale_down_probability: f64,

    /// Largest single step, before clamping to the remaining headroom
    pub max_scale_up_step: u32,
    pub max_scale_down_step: u32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            min_capacity: 1,
            max_capacity: 12,
            initial_order_capacity: 2,
            initial_payment_capacity: 2,
            scale_up_threshold: 15.0,
            scale_down_threshold: 10.0,
            scale_up_probability: 0.3,
            scale_down_probability: 0.2,
            max_scale_up_step: 3,
            max_scale_down_step: 2,
        }
    }
}

impl ScalingConfig {
    pub fn initial_capacity(&self, entity: Entity) -> u32 {
        match entity {
            Entity::Order => self.initial_order_capacity,
            Entity::Payment => self.initial_payment_capacity,
        }
    }
}

/// Probabilities of the cosmetic info messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatterConfig {
    /// Chance of a telemetry line right after a phase narrative
    pub phase_telemetry_probability: f64,

    /// A throughput line is considered whenever the phase spawn count is a
    /// positive multiple of this
    pub throughput_info_every: u64,
    pub throughput_info_probability: f64,
}

impl Default for ChatterConfig {
    fn default() -> Self {
        Self {
            phase_telemetry_probability: 0.4,
            throughput_info_every: 100,
            throughput_info_probability: 0.3,
        }
    }
}

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Base seed; session `n` uses `seed + n`. `None` seeds every session freshly.
    pub seed: Option<u64>,

    pub timing: TimingConfig,
    pub scaling: ScalingConfig,
    pub chatter: ChatterConfig,
    pub phases: Vec<TrafficPhase>,
    pub orders: CategorySampler,
    pub payments: CategorySampler,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            timing: TimingConfig::default(),
            scaling: ScalingConfig::default(),
            chatter: ChatterConfig::default(),
            phases: default_phase_table(),
            orders: CategorySampler::orders(),
            payments: CategorySampler::payments(),
        }
    }
}

impl SimulatorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_phases()?;
        self.validate_timing()?;
        self.validate_scaling()?;
        self.validate_chatter()?;

        self.orders
            .validate()
            .map_err(|source| ConfigError::Categories {
                table: "orders",
                source,
            })?;
        self.payments
            .validate()
            .map_err(|source| ConfigError::Categories {
                table: "payments",
                source,
            })?;

        Ok(())
    }

    fn validate_phases(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::EmptyPhaseTable);
        }

        for (index, phase) in self.phases.iter().enumerate() {
            let invalid = |reason| ConfigError::InvalidPhase {
                index,
                name: phase.name.clone(),
                reason,
            };
            if phase.name.trim().is_empty() {
                return Err(invalid("name is empty"));
            }
            if !phase.spawn_rate.is_finite() || phase.spawn_rate <= 0.0 {
                return Err(invalid("spawn_rate must be a positive number"));
            }
            if phase.duration_secs == 0 {
                return Err(invalid("duration_secs must be greater than zero"));
            }
        }

        Ok(())
    }

    fn validate_timing(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.ceiling_secs == 0 {
            return Err(ConfigError::Zero("timing.ceiling_secs"));
        }
        if timing.tick_ms == 0 {
            return Err(ConfigError::Zero("timing.tick_ms"));
        }
        if timing.spawn_pause_every == 0 {
            return Err(ConfigError::Zero("timing.spawn_pause_every"));
        }
        let jitter_ok = timing.jitter_min.is_finite()
            && timing.jitter_max.is_finite()
            && timing.jitter_min >= 0.0
            && timing.jitter_min <= timing.jitter_max;
        if !jitter_ok {
            return Err(ConfigError::InvalidJitter {
                min: timing.jitter_min,
                max: timing.jitter_max,
            });
        }
        Ok(())
    }

    fn validate_scaling(&self) -> Result<(), ConfigError> {
        let scaling = &self.scaling;
        if scaling.min_capacity < 1 || scaling.min_capacity > scaling.max_capacity {
            return Err(ConfigError::InvalidCapacityBounds {
                min: scaling.min_capacity,
                max: scaling.max_capacity,
            });
        }

        for entity in Entity::ALL {
            let value = scaling.initial_capacity(entity);
            if value < scaling.min_capacity || value > scaling.max_capacity {
                return Err(ConfigError::InitialCapacityOutOfRange {
                    entity,
                    value,
                    min: scaling.min_capacity,
                    max: scaling.max_capacity,
                });
            }
        }

        check_probability("scaling.scale_up_probability", scaling.scale_up_probability)?;
        check_probability(
            "scaling.scale_down_probability",
            scaling.scale_down_probability,
        )?;

        if scaling.max_scale_up_step == 0 {
            return Err(ConfigError::Zero("scaling.max_scale_up_step"));
        }
        if scaling.max_scale_down_step == 0 {
            return Err(ConfigError::Zero("scaling.max_scale_down_step"));
        }
        Ok(())
    }

    fn validate_chatter(&self) -> Result<(), ConfigError> {
        let chatter = &self.chatter;
        check_probability(
            "chatter.phase_telemetry_probability",
            chatter.phase_telemetry_probability,
        )?;
        check_probability(
            "chatter.throughput_info_probability",
            chatter.throughput_info_probability,
        )?;
        if chatter.throughput_info_every == 0 {
            return Err(ConfigError::Zero("chatter.throughput_info_every"));
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        SimulatorConfig::default().validate().unwrap();
    }

    #[test]
    fn test_nan_probability_rejected() {
        let mut config = SimulatorConfig::default();
        config.chatter.throughput_info_probability = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability { .. })
        ));
    }
}
