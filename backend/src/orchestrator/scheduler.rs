//! Event Scheduler - the per-session streaming loop
//!
//! Walks the phase table and writes one strictly ordered envelope stream:
//!
//! ```text
//! start
//! for each phase p:
//!   1. info(p.narrative)
//!   2. maybe info(telemetry)                 (phase_telemetry_probability)
//!   3. for order, payment: maybe scale-up/-down, then a short pause
//!   4. until p.duration_secs elapsed or the ceiling is hit:
//!        burst = floor(p.spawn_rate * uniform(jitter_min, jitter_max))
//!        emit `burst` spawns (short pause after every Nth session spawn)
//!        maybe info(throughput)              (phase spawns % every == 0)
//!        sleep one tick
//!   5. ceiling hit: abandon the remaining phases
//! end
//! ```
//!
//! The ceiling is checked before every tick and every spawn, and the whole
//! walk, `end` included, is bounded by the ceiling deadline: a write still
//! blocked on a slow client when the deadline passes is dropped.
//!
//! Any fault aborts the walk. The final `end` is then attempted once,
//! unless the fault was the transport closing, in which case there is no
//! one left to receive it. Faults are logged and reported in the
//! [`SessionReport`]; nothing is retried.
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! use flowprobe_core_rs::framing::MemorySink;
//! use flowprobe_core_rs::models::TrafficPhase;
//! use flowprobe_core_rs::orchestrator::{EventScheduler, SessionOutcome, SimulatorConfig};
//! use std::sync::Arc;
//!
//! let config = SimulatorConfig {
//!     phases: vec![TrafficPhase::new("lunch_rush", 20.0, 2, "Lunch rush")],
//!     ..SimulatorConfig::default()
//! };
//! let mut sink = MemorySink::new();
//! let scheduler = EventScheduler::new(Arc::new(config), 42).unwrap();
//! let report = scheduler.run(&mut sink).await;
//!
//! assert_eq!(report.outcome, SessionOutcome::Completed);
//! assert!(report.spawn_count > 0);
//! # }
//! ```

use crate::core::time::{PhaseExit, SessionClock};
use crate::framing::{frame, FrameError, FrameSink, SinkError};
use crate::models::{Entity, Envelope, SimulationSession, TrafficPhase};
use crate::orchestrator::chatter;
use crate::orchestrator::config::{ConfigError, SimulatorConfig};
use crate::rng::RngManager;
use crate::sampling::SamplingError;
use crate::scaling::CapacityController;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

// ============================================================================
// Errors and Reports
// ============================================================================

/// Faults that abort a session's generation loop
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("sampling failed: {0}")]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl SchedulerError {
    /// True when the client is gone and nothing further can be written.
    pub fn is_transport_closed(&self) -> bool {
        matches!(self, SchedulerError::Sink(SinkError::Closed))
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every phase ran to its duration
    Completed,
    /// The session ceiling cut the phase walk short
    CeilingReached,
    /// The client disconnected mid-stream
    Disconnected,
    /// Generation aborted on a fault (message included)
    Faulted(String),
}

/// Summary of one finished session
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub seed: u64,
    pub elapsed: Duration,
    pub spawn_count: u64,
    pub info_count: u64,
    pub scale_count: u64,
    pub phases_entered: usize,
    /// Whether the final `end` envelope reached the sink
    pub end_sent: bool,
    pub outcome: SessionOutcome,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Drives one session from `start` to `end`.
///
/// Created per connection and consumed by [`EventScheduler::run`].
pub struct EventScheduler {
    config: Arc<SimulatorConfig>,
    controller: CapacityController,
    session: SimulationSession,
    rng: RngManager,
    seed: u64,
    phases_entered: usize,
}

impl EventScheduler {
    /// Create a scheduler with a fresh session seeded from `seed`.
    ///
    /// The config is validated first; a rejected config never starts a
    /// session. The session id is the first draw of the session's RNG, so
    /// equal seeds give equal session ids.
    pub fn new(config: Arc<SimulatorConfig>, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = RngManager::new(seed);
        let scaling = config.scaling.clone();
        let session = SimulationSession::new(
            rng.uuid(),
            Utc::now(),
            scaling.initial_order_capacity,
            scaling.initial_payment_capacity,
        );

        Ok(Self {
            config,
            controller: CapacityController::new(scaling),
            session,
            rng,
            seed,
            phases_entered: 0,
        })
    }

    pub fn session(&self) -> &SimulationSession {
        &self.session
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run the session to completion against `sink`.
    ///
    /// Never fails: every fault is logged and reflected in the returned report.
    pub async fn run<S: FrameSink + Send>(mut self, sink: &mut S) -> SessionReport {
        let mut clock = SessionClock::start(self.config.timing.ceiling());
        let deadline = clock.deadline();
        let session_id = self.session.session_id();

        info!(
            session_id = %session_id,
            seed = self.seed,
            phases = self.config.phases.len(),
            "Stream started"
        );

        // Err(Elapsed): a write was still pending when the ceiling passed.
        let walked = timeout_at(deadline, self.walk(sink, &mut clock))
            .await
            .unwrap_or(Ok(PhaseExit::CeilingReached));

        let outcome = match walked {
            Ok(PhaseExit::Expired) => SessionOutcome::Completed,
            Ok(PhaseExit::CeilingReached) => {
                info!(
                    session_id = %session_id,
                    ceiling_secs = clock.ceiling().as_secs(),
                    phase = self.session.current_phase_index(),
                    "Session ceiling reached, abandoning remaining phases"
                );
                SessionOutcome::CeilingReached
            }
            Err(e) if e.is_transport_closed() => {
                info!(session_id = %session_id, "Client disconnected");
                SessionOutcome::Disconnected
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Error in stream generation");
                SessionOutcome::Faulted(e.to_string())
            }
        };

        let end_sent = if outcome == SessionOutcome::Disconnected {
            debug!(session_id = %session_id, "Transport gone, skipping end message");
            false
        } else {
            self.finish(sink, deadline).await
        };

        let report = SessionReport {
            session_id,
            seed: self.seed,
            elapsed: clock.session_elapsed(),
            spawn_count: self.session.spawn_count(),
            info_count: self.session.info_count(),
            scale_count: self.session.scale_count(),
            phases_entered: self.phases_entered,
            end_sent,
            outcome,
        };

        info!(
            session_id = %session_id,
            duration_secs = report.elapsed.as_secs_f64(),
            spawn = report.spawn_count,
            info = report.info_count,
            scale = report.scale_count,
            outcome = ?report.outcome,
            "Stream ended"
        );

        report
    }

    /// `start`, then every phase in order.
    async fn walk<S: FrameSink + Send>(
        &mut self,
        sink: &mut S,
        clock: &mut SessionClock,
    ) -> Result<PhaseExit, SchedulerError> {
        let start = Envelope::start(self.session.session_id(), self.session.started_at());
        self.emit(sink, &start).await?;

        let config = Arc::clone(&self.config);
        for (index, phase) in config.phases.iter().enumerate() {
            clock.enter_phase(index);
            self.session.set_phase_index(index);
            self.phases_entered += 1;

            if self.run_phase(sink, clock, phase).await? == PhaseExit::CeilingReached {
                return Ok(PhaseExit::CeilingReached);
            }
        }

        Ok(PhaseExit::Expired)
    }

    async fn run_phase<S: FrameSink + Send>(
        &mut self,
        sink: &mut S,
        clock: &SessionClock,
        phase: &TrafficPhase,
    ) -> Result<PhaseExit, SchedulerError> {
        let config = Arc::clone(&self.config);
        let timing = &config.timing;
        let chatter_cfg = &config.chatter;

        debug!(
            phase = %phase.name,
            rate = phase.spawn_rate,
            duration_secs = phase.duration_secs,
            "Entering phase"
        );

        self.emit(sink, &Envelope::info(phase.narrative.clone()))
            .await?;

        if self.rng.chance(chatter_cfg.phase_telemetry_probability) {
            let line = chatter::phase_telemetry(&mut self.rng);
            self.emit(sink, &Envelope::info(line)).await?;
        }

        for entity in Entity::ALL {
            let signal = self.controller.maybe_scale(
                phase.spawn_rate,
                entity,
                &mut self.session,
                &mut self.rng,
            );
            if let Some(signal) = signal {
                debug!(
                    kind = signal.kind(),
                    entity = %entity,
                    capacity = self.session.capacity(entity),
                    "Scaling signal"
                );
                self.emit(sink, &signal).await?;
                pause(clock, timing.scale_pause()).await;
            }
        }

        let mut phase_spawns: u64 = 0;
        loop {
            if let Some(exit) = clock.check(phase.duration()) {
                return Ok(exit);
            }

            let jittered =
                phase.spawn_rate * self.rng.uniform(timing.jitter_min, timing.jitter_max);
            let burst = jittered.floor() as u64;

            for _ in 0..burst {
                if clock.ceiling_reached() {
                    return Ok(PhaseExit::CeilingReached);
                }
                let spawn = self.build_spawn()?;
                self.emit(sink, &spawn).await?;
                phase_spawns += 1;

                if self.session.spawn_count() % timing.spawn_pause_every == 0 {
                    pause(clock, timing.spawn_pause()).await;
                }
            }

            if phase_spawns > 0
                && phase_spawns % chatter_cfg.throughput_info_every == 0
                && self.rng.chance(chatter_cfg.throughput_info_probability)
            {
                let line =
                    chatter::throughput_info(&mut self.rng, phase_spawns, &self.session, jittered);
                self.emit(sink, &Envelope::info(line)).await?;
            }

            pause(clock, timing.tick()).await;
        }
    }

    fn build_spawn(&mut self) -> Result<Envelope, SchedulerError> {
        let order = self.config.orders.sample(&mut self.rng)?;
        let payment = self.config.payments.sample(&mut self.rng)?;
        Ok(Envelope::Spawn {
            uuid: self.rng.uuid(),
            order,
            payment,
        })
    }

    /// Frame and write one envelope, then count it.
    async fn emit<S: FrameSink + Send>(
        &mut self,
        sink: &mut S,
        envelope: &Envelope,
    ) -> Result<(), SchedulerError> {
        let bytes = frame(envelope)?;
        sink.send(bytes).await?;

        match envelope {
            Envelope::Spawn { .. } => self.session.record_spawn(),
            Envelope::Info { .. } => self.session.record_info(),
            Envelope::ScaleUp { .. } | Envelope::ScaleDown { .. } => self.session.record_scale(),
            Envelope::Start { .. } | Envelope::End { .. } => {}
        }
        Ok(())
    }

    /// Best-effort final `end`, bounded by the ceiling deadline.
    ///
    /// A failure here is logged and swallowed. A sink that can take the frame
    /// immediately still gets it once the deadline has passed.
    async fn finish<S: FrameSink + Send>(&mut self, sink: &mut S, deadline: Instant) -> bool {
        let session_id = self.session.session_id();
        let end = Envelope::end(session_id, Utc::now());
        match timeout_at(deadline, self.emit(sink, &end)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to deliver end message"
                );
                false
            }
            Err(_) => {
                warn!(
                    session_id = %session_id,
                    "End message not accepted before the session ceiling"
                );
                false
            }
        }
    }
}

/// Cooperative pause that never overruns the session ceiling.
async fn pause(clock: &SessionClock, duration: Duration) {
    tokio::time::sleep(clock.clamp_to_ceiling(duration)).await;
}
