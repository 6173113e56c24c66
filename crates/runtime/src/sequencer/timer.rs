//! Phase-owned timers.
//!
//! A timed phase arms exactly one [`PhaseTimer`] when it is entered, and the
//! timer is released whenever the phase is left, whatever caused the exit.
//! Whoever drives the clock sleeps for [`PhaseTimer::delay`] and hands the id
//! back to the sequencer; an id that no longer matches the armed timer is
//! stale and does nothing.

use std::time::Duration;

use super::SequencePhase;

/// Identity of one armed timer. Never reused within a sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Delay owned by a timed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimer {
    pub id: TimerId,
    pub phase: SequencePhase,
    pub delay: Duration,
}

/// The single timer slot of a sequencer.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    armed: Option<PhaseTimer>,
    next_id: u64,
}

impl TimerSlot {
    pub(crate) fn arm(&mut self, phase: SequencePhase, delay: Duration) -> PhaseTimer {
        let timer = PhaseTimer {
            id: TimerId(self.next_id),
            phase,
            delay,
        };
        self.next_id += 1;
        self.armed = Some(timer);
        timer
    }

    pub(crate) fn release(&mut self) -> Option<PhaseTimer> {
        self.armed.take()
    }

    pub(crate) fn armed(&self) -> Option<PhaseTimer> {
        self.armed
    }

    pub(crate) fn is_armed(&self, id: TimerId) -> bool {
        self.armed.is_some_and(|timer| timer.id == id)
    }
}
