//! Simulation orchestration.
//!
//! Provides the multi-hart [`Simulator`] and the interactive console built on it.

/// Line-oriented introspection console.
pub mod interactive;

/// Hart scheduling, host relay and run loop.
pub mod simulator;

pub use interactive::{Command, CommandError};
pub use simulator::{Simulator, StopHandle};
