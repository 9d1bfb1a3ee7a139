//! Capacity controller
//!
//! Decides, once per phase and per dimension, whether to emit a cosmetic
//! scaling signal. Decisions follow the phase's nominal rate:
//!
//! - rate above `scale_up_threshold` and headroom left: scale up with
//!   probability `scale_up_probability` by `min(1..=max_scale_up_step, headroom)`
//! - rate below `scale_down_threshold` and slack left: scale down with
//!   probability `scale_down_probability` by `min(1..=max_scale_down_step, slack)`
//!
//! The chosen factor is applied to the session before the envelope is
//! returned, so capacities never leave `[min_capacity, max_capacity]`.

use crate::models::{Entity, Envelope, SimulationSession};
use crate::orchestrator::config::ScalingConfig;
use crate::rng::RngManager;

/// Applies scaling decisions to a session's capacity counters.
#[derive(Debug, Clone)]
pub struct CapacityController {
    config: ScalingConfig,
}

impl CapacityController {
    pub fn new(config: ScalingConfig) -> Self {
        Self { config }
    }

    /// Evaluate one dimension at the given nominal rate.
    ///
    /// Returns `Envelope::ScaleUp` / `Envelope::ScaleDown` when the session's
    /// capacity was changed, `None` otherwise. The probability draw is only
    /// made when the rate condition and headroom allow a change.
    ///
    /// # Example
    /// ```
    /// use flowprobe_core_rs::models::{Entity, SimulationSession};
    /// use flowprobe_core_rs::orchestrator::ScalingConfig;
    /// use flowprobe_core_rs::rng::RngManager;
    /// use flowprobe_core_rs::scaling::CapacityController;
    ///
    /// let controller = CapacityController::new(ScalingConfig::default());
    /// let mut session = SimulationSession::new(
    ///     uuid::Uuid::nil(), chrono::Utc::now(), 12, 2,
    /// );
    /// let mut rng = RngManager::new(7);
    ///
    /// // Already at max: no headroom, never scales up.
    /// assert!(controller.maybe_scale(20.0, Entity::Order, &mut session, &mut rng).is_none());
    /// ```
    pub fn maybe_scale(
        &self,
        current_rate: f64,
        entity: Entity,
        session: &mut SimulationSession,
        rng: &mut RngManager,
    ) -> Option<Envelope> {
        let cfg = &self.config;
        let current = session.capacity(entity);

        if current_rate > cfg.scale_up_threshold && current < cfg.max_capacity {
            if !rng.chance(cfg.scale_up_probability) {
                return None;
            }
            let step = rng.range_inclusive(1, cfg.max_scale_up_step as i64) as u32;
            let factor = step.min(cfg.max_capacity - current);
            *session.capacity_mut(entity) += factor;
            Some(Envelope::ScaleUp { entity, factor })
        } else if current_rate < cfg.scale_down_threshold && current > cfg.min_capacity {
            if !rng.chance(cfg.scale_down_probability) {
                return None;
            }
            let step = rng.range_inclusive(1, cfg.max_scale_down_step as i64) as u32;
            let factor = step.min(current - cfg.min_capacity);
            *session.capacity_mut(entity) -= factor;
            Some(Envelope::ScaleDown { entity, factor })
        } else {
            None
        }
    }
}
