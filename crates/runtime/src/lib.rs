//! Runtime orchestration for dice roll presentation.
//!
//! This crate wires the pure dice math from `dice-core` into a timed,
//! interactive roll sequence and broadcasts the finalized result. Consumers
//! start a [`Session`] and drive it through [`SessionHandle`], or embed a
//! [`RollSequencer`] directly and feed it triggers themselves.
//!
//! Modules are organized by responsibility:
//! - [`sequencer`] hosts the phase state machine and its timers
//! - [`events`] provides the name-keyed event bus and published payloads
//! - [`session`] owns the per-session singletons and the timer driver
//! - [`config`] loads presentation delays and seeds
pub mod config;
pub mod error;
pub mod events;
pub mod sequencer;
pub mod session;

pub use config::{SequencerConfig, SessionConfig};
pub use error::{Result, SequenceError};
pub use events::{
    EventBus, FinalizedRoll, HandlerCriticality, HandlerError, HandlerResult, PublishReport,
    ROLL_FINALIZED, SacrificedDie, SubscriptionId,
};
pub use sequencer::{
    PhaseTimer, RollDisplay, RollSequencer, SequencePhase, Submission, TimerId, Trigger,
};
pub use session::{Session, SessionHandle};
