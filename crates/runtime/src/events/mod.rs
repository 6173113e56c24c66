//! Name-keyed event bus and the payloads the roll runtime publishes.
//!
//! The sequencer publishes exactly one [`FinalizedRoll`] on [`ROLL_FINALIZED`]
//! per completed sequence; resource services subscribe to react to it.

mod bus;
mod types;

pub use bus::{
    EventBus, HandlerCriticality, HandlerError, HandlerResult, PublishReport, SubscriptionId,
};
pub use types::{FinalizedRoll, ROLL_FINALIZED, SacrificedDie};
