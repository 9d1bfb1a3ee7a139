//! Per-connection simulation session
//!
//! One `SimulationSession` exists per client connection. It is created when
//! the stream opens, owned by that connection's scheduler and dropped when
//! the stream ends. Nothing in it is shared across connections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Capacity dimension targeted by a scaling signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Order,
    Payment,
}

impl Entity {
    /// Both dimensions, in the order the scheduler evaluates them.
    pub const ALL: [Entity; 2] = [Entity::Order, Entity::Payment];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Order => "order",
            Entity::Payment => "payment",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one streaming session.
///
/// Counters only ever grow. Capacities are changed exclusively by the
/// capacity controller, which keeps them inside the configured bounds.
#[derive(Debug, Clone)]
pub struct SimulationSession {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    order_capacity: u32,
    payment_capacity: u32,
    current_phase_index: usize,
    spawn_count: u64,
    info_count: u64,
    scale_count: u64,
}

impl SimulationSession {
    /// Create a session with the given starting capacities.
    pub fn new(
        session_id: Uuid,
        started_at: DateTime<Utc>,
        order_capacity: u32,
        payment_capacity: u32,
    ) -> Self {
        Self {
            session_id,
            started_at,
            order_capacity,
            payment_capacity,
            current_phase_index: 0,
            spawn_count: 0,
            info_count: 0,
            scale_count: 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn capacity(&self, entity: Entity) -> u32 {
        match entity {
            Entity::Order => self.order_capacity,
            Entity::Payment => self.payment_capacity,
        }
    }

    pub(crate) fn capacity_mut(&mut self, entity: Entity) -> &mut u32 {
        match entity {
            Entity::Order => &mut self.order_capacity,
            Entity::Payment => &mut self.payment_capacity,
        }
    }

    pub fn current_phase_index(&self) -> usize {
        self.current_phase_index
    }

    pub(crate) fn set_phase_index(&mut self, index: usize) {
        self.current_phase_index = index;
    }

    pub fn spawn_count(&self) -> u64 {
        self.spawn_count
    }

    pub fn info_count(&self) -> u64 {
        self.info_count
    }

    pub fn scale_count(&self) -> u64 {
        self.scale_count
    }

    pub(crate) fn record_spawn(&mut self) {
        self.spawn_count += 1;
    }

    pub(crate) fn record_info(&mut self) {
        self.info_count += 1;
    }

    pub(crate) fn record_scale(&mut self) {
        self.scale_count += 1;
    }
}
