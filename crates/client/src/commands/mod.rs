//! Command implementations for the `dice` binary
//!
//! Each command owns its CLI args and execution logic.

mod replay;
mod roll;

pub use replay::Replay;
pub use roll::Roll;
