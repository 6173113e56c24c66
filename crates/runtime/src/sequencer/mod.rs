//! Roll presentation state machine.
//!
//! [`RollSequencer`] owns the single in-flight roll. A request is resolved up
//! front, then revealed through timed phases; interactive purposes stop at a
//! decision point where the user may sacrifice one die before the result is
//! published on the bus.
//!
//! ```text
//! Idle ─submit─▶ Rolling ─▶ BonusReveal ─▶ TotalReveal ─┬─(free/named)──────────▶ Closing ─▶ Idle
//!                                                      └─(skill-*)─▶ AwaitingDecision
//!                                 AwaitingDecision ─done──────────────────────▶ Closing
//!                                 AwaitingDecision ─sacrifice─▶ SacrificeSelect ─confirm─▶ Closing
//!                                                  ◀──────cancel────────────────┘
//! ```
//!
//! Every phase change goes through one place, which releases the armed timer of
//! the phase being left and arms the timer of the phase being entered.

mod display;
mod phase;
mod timer;

pub use display::RollDisplay;
pub use phase::{SequencePhase, Trigger};
pub use timer::{PhaseTimer, TimerId};

use std::time::Duration;

use dice_core::{
    BONUS_WIDTH, DieRoller, Purpose, RollRecord, RollRequest, TOTAL_WIDTH, generate_outcomes,
    pad_digits,
};
use tracing::{debug, info, trace};

use crate::config::SequencerConfig;
use crate::error::{Result, SequenceError};
use crate::events::{EventBus, FinalizedRoll, SacrificedDie};
use timer::TimerSlot;

/// What happened to a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The request was rolled and a new sequence began.
    Started,
    /// A sequence was already in flight; the request was dropped.
    Ignored,
}

/// The roll being presented.
struct ActiveRoll {
    record: RollRecord,
    purpose: Purpose,
    bonus_digits: String,
    total_digits: String,
    total: i64,
    finalized: bool,
}

/// Drives one roll at a time from submission back to idle.
pub struct RollSequencer {
    config: SequencerConfig,
    roller: Box<dyn DieRoller + Send>,
    bus: EventBus<FinalizedRoll>,
    phase: SequencePhase,
    active: Option<ActiveRoll>,
    display: RollDisplay,
    timer: TimerSlot,
    /// Finalized rolls wait in `finalized` for the owner to publish them.
    defer_publish: bool,
    finalized: Option<FinalizedRoll>,
}

impl RollSequencer {
    pub fn new(
        config: SequencerConfig,
        bus: EventBus<FinalizedRoll>,
        roller: impl DieRoller + Send + 'static,
    ) -> Self {
        Self {
            config,
            roller: Box::new(roller),
            bus,
            phase: SequencePhase::Idle,
            active: None,
            display: RollDisplay::default(),
            timer: TimerSlot::default(),
            defer_publish: false,
            finalized: None,
        }
    }

    /// Queues finalized rolls instead of publishing them from inside the
    /// trigger that finalized them.
    ///
    /// Owners that keep the sequencer behind a lock use this so handlers can
    /// call back into them; they drain the queue with
    /// [`RollSequencer::take_finalized`] once the lock is released.
    #[must_use]
    pub fn deferring_publish(mut self) -> Self {
        self.defer_publish = true;
        self
    }

    /// Takes the finalized roll waiting to be published, if any.
    pub fn take_finalized(&mut self) -> Option<FinalizedRoll> {
        self.finalized.take()
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    pub fn display(&self) -> &RollDisplay {
        &self.display
    }

    pub fn selection(&self) -> Option<usize> {
        self.display.selection
    }

    /// Record of the in-flight roll, if any.
    pub fn record(&self) -> Option<&RollRecord> {
        self.active.as_ref().map(|active| &active.record)
    }

    /// Timer owned by the current phase, if it is a timed one.
    pub fn pending_timer(&self) -> Option<PhaseTimer> {
        self.timer.armed()
    }

    pub fn bus(&self) -> &EventBus<FinalizedRoll> {
        &self.bus
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Starts a sequence for `request`.
    ///
    /// While a sequence is in flight the request is ignored without error.
    /// From idle, an invalid request is rejected before anything changes.
    pub fn submit_request(&mut self, request: &RollRequest) -> Result<Submission> {
        if self.phase != SequencePhase::Idle {
            debug!(
                target: "runtime::sequencer",
                phase = %self.phase,
                purpose = %request.purpose,
                "Roll already in flight, ignoring request"
            );
            return Ok(Submission::Ignored);
        }

        let record = generate_outcomes(request, self.roller.as_mut())?;
        let total = clamp_total(record.total());

        debug!(
            target: "runtime::sequencer",
            purpose = %request.purpose,
            formula = record.formula(),
            total,
            "Roll resolved"
        );

        self.active = Some(ActiveRoll {
            bonus_digits: pad_digits(request.bonus, BONUS_WIDTH),
            total_digits: pad_digits(total, TOTAL_WIDTH),
            record,
            purpose: request.purpose.clone(),
            total,
            finalized: false,
        });
        self.display = RollDisplay::default();
        self.enter(SequencePhase::Rolling);

        Ok(Submission::Started)
    }

    /// The dice animation finished; show the individual faces.
    pub fn animation_complete(&mut self) -> Result<()> {
        let dice = self
            .active_in(SequencePhase::Rolling, Trigger::AnimationComplete)?
            .record
            .dice()
            .collect();

        self.display.dice = Some(dice);
        self.enter(SequencePhase::BonusReveal);
        Ok(())
    }

    /// Fires the timer `id`. Returns `false` when the id is stale.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if !self.timer.is_armed(id) {
            trace!(target: "runtime::sequencer", ?id, "Stale timer ignored");
            return false;
        }
        self.advance().is_ok()
    }

    /// Advances the current timed phase as if its delay had elapsed.
    pub fn elapse(&mut self) -> Result<()> {
        if !self.phase.is_timed() {
            return Err(self.unexpected(Trigger::Elapsed));
        }
        self.advance()
    }

    /// Accepts the roll as is.
    pub fn choose_done(&mut self) -> Result<()> {
        self.active_in(SequencePhase::AwaitingDecision, Trigger::ChooseDone)?;

        self.enter(SequencePhase::Closing);
        self.finalize(None);
        Ok(())
    }

    /// Opens per-die selection.
    pub fn choose_sacrifice(&mut self) -> Result<()> {
        self.active_in(SequencePhase::AwaitingDecision, Trigger::ChooseSacrifice)?;

        self.display.sacrifice_enabled = true;
        self.enter(SequencePhase::SacrificeSelect);
        Ok(())
    }

    /// Chooses die `index` (flat order) and previews the reduced total.
    ///
    /// The stored record is never modified.
    pub fn select_die(&mut self, index: usize) -> Result<()> {
        let active = self.active_in(SequencePhase::SacrificeSelect, Trigger::SelectDie)?;
        let value = active
            .record
            .die(index)
            .ok_or(SequenceError::DieOutOfRange {
                index,
                len: active.record.dice_count(),
            })?;
        let adjusted = active.total - i64::from(value);

        self.display.selection = Some(index);
        self.display.displayed_total = Some(adjusted);
        self.display.total = Some(pad_digits(adjusted, TOTAL_WIDTH));

        debug!(
            target: "runtime::sequencer",
            index,
            value,
            adjusted,
            "Die selected for sacrifice"
        );
        Ok(())
    }

    /// Publishes the roll with the selected die subtracted.
    pub fn confirm_sacrifice(&mut self) -> Result<()> {
        let active = self.active_in(SequencePhase::SacrificeSelect, Trigger::ConfirmSacrifice)?;
        let index = self.display.selection.ok_or(SequenceError::NoDieSelected)?;
        let value = active.record.die(index).ok_or(SequenceError::DieOutOfRange {
            index,
            len: active.record.dice_count(),
        })?;

        self.display.sacrifice_enabled = false;
        self.enter(SequencePhase::Closing);
        self.finalize(Some(SacrificedDie { index, value }));
        Ok(())
    }

    /// Leaves selection and restores the unmodified total.
    pub fn cancel_sacrifice(&mut self) -> Result<()> {
        let active = self.active_in(SequencePhase::SacrificeSelect, Trigger::CancelSacrifice)?;
        let (total, digits) = (active.total, active.total_digits.clone());

        self.display.selection = None;
        self.display.sacrifice_enabled = false;
        self.display.displayed_total = Some(total);
        self.display.total = Some(digits);
        self.enter(SequencePhase::AwaitingDecision);
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        match self.phase {
            SequencePhase::Rolling => self.animation_complete(),
            SequencePhase::BonusReveal => self.reveal_bonus(),
            SequencePhase::TotalReveal => self.resolve_total(),
            SequencePhase::Closing => {
                self.close();
                Ok(())
            }
            _ => Err(self.unexpected(Trigger::Elapsed)),
        }
    }

    fn reveal_bonus(&mut self) -> Result<()> {
        let digits = self
            .active_in(SequencePhase::BonusReveal, Trigger::Elapsed)?
            .bonus_digits
            .clone();

        self.display.bonus = Some(digits);
        self.enter(SequencePhase::TotalReveal);
        Ok(())
    }

    fn resolve_total(&mut self) -> Result<()> {
        let active = self.active_in(SequencePhase::TotalReveal, Trigger::Elapsed)?;
        let (free, interactive) = (active.purpose.is_free(), active.purpose.is_interactive());
        let (total, digits) = (active.total, active.total_digits.clone());

        if !free {
            self.display.total = Some(digits);
            self.display.displayed_total = Some(total);
        }

        if interactive {
            self.enter(SequencePhase::AwaitingDecision);
        } else {
            self.enter(SequencePhase::Closing);
            self.finalize(None);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.active = None;
        self.display = RollDisplay::default();
        self.enter(SequencePhase::Idle);
    }

    /// Publishes (or queues) the in-flight roll. At most once per sequence.
    fn finalize(&mut self, sacrificed: Option<SacrificedDie>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.finalized {
            return;
        }
        active.finalized = true;

        let roll = FinalizedRoll {
            total: active.total - sacrificed.map_or(0, |die| i64::from(die.value)),
            formula: (!active.record.is_empty()).then(|| active.record.formula().to_owned()),
            purpose: active.purpose.to_string(),
            sacrificed,
        };

        info!(
            target: "runtime::sequencer",
            total = roll.total,
            purpose = %roll.purpose,
            formula = ?roll.formula,
            sacrificed = ?roll.sacrificed,
            "Roll finalized"
        );

        if self.defer_publish {
            self.finalized = Some(roll);
        } else {
            self.bus.publish_finalized(&roll);
        }
    }

    /// Single entry point for phase changes.
    fn enter(&mut self, next: SequencePhase) {
        let previous = self.phase;
        if let Some(timer) = self.timer.release() {
            trace!(target: "runtime::sequencer", id = ?timer.id, phase = %timer.phase, "Timer released");
        }

        self.phase = next;
        if let Some(delay) = self.delay_for(next) {
            let timer = self.timer.arm(next, delay);
            trace!(target: "runtime::sequencer", id = ?timer.id, ?delay, "Timer armed");
        }

        debug!(target: "runtime::sequencer", from = %previous, to = %next, "Phase transition");
    }

    fn delay_for(&self, phase: SequencePhase) -> Option<Duration> {
        match phase {
            SequencePhase::Rolling => Some(self.config.animation_delay),
            SequencePhase::BonusReveal => Some(self.config.bonus_delay),
            SequencePhase::TotalReveal => Some(self.config.total_delay),
            SequencePhase::Closing => Some(self.config.close_delay),
            _ => None,
        }
    }

    fn active_in(&self, phase: SequencePhase, trigger: Trigger) -> Result<&ActiveRoll> {
        match &self.active {
            Some(active) if self.phase == phase => Ok(active),
            _ => Err(self.unexpected(trigger)),
        }
    }

    fn unexpected(&self, trigger: Trigger) -> SequenceError {
        SequenceError::UnexpectedTrigger {
            phase: self.phase,
            trigger,
        }
    }
}

fn clamp_total(total: u64) -> i64 {
    i64::try_from(total).unwrap_or(i64::MAX)
}
