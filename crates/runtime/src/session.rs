//! Session wiring: the bus, the sequencer, and the task that drives timers.
//!
//! A [`Session`] owns exactly one [`EventBus`] and one [`RollSequencer`] for
//! its lifetime. Clients talk to it through the cloneable [`SessionHandle`];
//! the driver task sleeps for whatever timer the current phase owns and fires
//! it, so timed phases advance without any caller involvement.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dice_core::{PcgRoller, RandRoller, RollRecord, RollRequest};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::events::{EventBus, FinalizedRoll};
use crate::sequencer::{RollDisplay, RollSequencer, SequencePhase, Submission};

struct Shared {
    sequencer: Mutex<RollSequencer>,
    bus: EventBus<FinalizedRoll>,
    /// Wakes the driver when a trigger armed a different timer.
    wake: Notify,
    phase: watch::Sender<SequencePhase>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RollSequencer> {
        self.sequencer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the sequencer, then publishes the resulting phase and
    /// wakes the driver if the armed timer changed.
    ///
    /// A roll finalized by `f` is published after the lock is released, so
    /// handlers may call back into the session.
    fn apply<T>(&self, wake_driver: bool, f: impl FnOnce(&mut RollSequencer) -> T) -> T {
        let mut sequencer = self.lock();
        let before = sequencer.pending_timer().map(|timer| timer.id);
        let output = f(&mut sequencer);
        let after = sequencer.pending_timer().map(|timer| timer.id);
        let phase = sequencer.phase();
        let finalized = sequencer.take_finalized();
        drop(sequencer);

        self.phase.send_if_modified(|current| {
            let changed = *current != phase;
            *current = phase;
            changed
        });
        if wake_driver && before != after {
            self.wake.notify_one();
        }
        if let Some(roll) = finalized {
            self.bus.publish_finalized(&roll);
        }
        output
    }
}

/// Owner of one roll session.
///
/// Dropping the session stops its timer driver.
pub struct Session {
    handle: SessionHandle,
    driver: JoinHandle<()>,
}

impl Session {
    /// Creates the session singletons and spawns the timer driver.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: SessionConfig) -> Self {
        let bus = EventBus::new();
        let sequencer = match config.seed {
            Some(seed) => {
                RollSequencer::new(config.sequencer.clone(), bus.clone(), PcgRoller::new(seed))
            }
            None => RollSequencer::new(
                config.sequencer.clone(),
                bus.clone(),
                RandRoller::new(StdRng::from_entropy()),
            ),
        }
        .deferring_publish();
        let (phase, _) = watch::channel(SequencePhase::Idle);

        let shared = Arc::new(Shared {
            sequencer: Mutex::new(sequencer),
            bus,
            wake: Notify::new(),
            phase,
        });

        let driver = tokio::spawn(drive_timers(Arc::clone(&shared)));
        info!(
            target: "runtime::session",
            seeded = config.seed.is_some(),
            "Roll session started"
        );

        Self {
            handle: SessionHandle { shared },
            driver,
        }
    }

    /// Cloneable handle for clients.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stops the timer driver and releases the session.
    pub async fn shutdown(mut self) {
        self.driver.abort();
        // The driver only ends by being aborted, so the join error is expected.
        let _ = (&mut self.driver).await;
        info!(target: "runtime::session", "Roll session shut down");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Client-facing façade over a session.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    /// Session-scoped bus carrying `rollFinalized`.
    pub fn bus(&self) -> &EventBus<FinalizedRoll> {
        &self.shared.bus
    }

    pub fn phase(&self) -> SequencePhase {
        self.shared.lock().phase()
    }

    /// Snapshot of the display state.
    pub fn display(&self) -> RollDisplay {
        self.shared.lock().display().clone()
    }

    /// Snapshot of the in-flight record.
    pub fn record(&self) -> Option<RollRecord> {
        self.shared.lock().record().cloned()
    }

    /// Watch channel following phase changes.
    pub fn phases(&self) -> watch::Receiver<SequencePhase> {
        self.shared.phase.subscribe()
    }

    pub fn submit_request(&self, request: &RollRequest) -> Result<Submission> {
        self.shared
            .apply(true, |sequencer| sequencer.submit_request(request))
    }

    pub fn animation_complete(&self) -> Result<()> {
        self.shared
            .apply(true, RollSequencer::animation_complete)
    }

    pub fn choose_done(&self) -> Result<()> {
        self.shared.apply(true, RollSequencer::choose_done)
    }

    pub fn choose_sacrifice(&self) -> Result<()> {
        self.shared.apply(true, RollSequencer::choose_sacrifice)
    }

    pub fn select_die(&self, index: usize) -> Result<()> {
        self.shared
            .apply(true, |sequencer| sequencer.select_die(index))
    }

    pub fn confirm_sacrifice(&self) -> Result<()> {
        self.shared.apply(true, RollSequencer::confirm_sacrifice)
    }

    pub fn cancel_sacrifice(&self) -> Result<()> {
        self.shared.apply(true, RollSequencer::cancel_sacrifice)
    }

    /// Waits until the phase satisfies `predicate`, returning that phase.
    pub async fn wait_for_phase(
        &self,
        predicate: impl Fn(SequencePhase) -> bool,
    ) -> SequencePhase {
        let mut phases = self.phases();
        match phases.wait_for(|phase| predicate(*phase)).await {
            Ok(phase) => *phase,
            // The sender lives as long as `self`, so this is unreachable in practice.
            Err(_) => self.phase(),
        }
    }

    /// Waits until the in-flight sequence (if any) returned to idle.
    pub async fn wait_for_idle(&self) {
        self.wait_for_phase(|phase| phase == SequencePhase::Idle)
            .await;
    }
}

async fn drive_timers(shared: Arc<Shared>) {
    loop {
        let armed = shared.lock().pending_timer();
        match armed {
            Some(timer) => {
                tokio::select! {
                    _ = tokio::time::sleep(timer.delay) => {
                        let fired = shared.apply(false, |sequencer| sequencer.fire(timer.id));
                        debug!(
                            target: "runtime::session",
                            id = ?timer.id,
                            phase = %timer.phase,
                            fired,
                            "Phase timer elapsed"
                        );
                    }
                    _ = shared.wake.notified() => {}
                }
            }
            None => shared.wake.notified().await,
        }
    }
}
