//! Common utilities and types used throughout the simulation core.
//!
//! This module provides the building blocks shared by the devices and the orchestrator:
//! 1. **Constants:** Debug RAM geometry and host channel encodings.
//! 2. **Error Handling:** Bus, host channel, debug module, hart and simulator errors.
//! 3. **Hart Sets:** Membership sets keyed by hart id.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types.
pub mod error;

/// Ordered set of hart identifiers.
pub mod hart_set;

pub use constants::DEBUG_RAM_SIZE;
pub use error::{
    BusError, ConfigError, DebugModuleError, Direction, HartError, HostChannelError, SimError,
};
pub use hart_set::HartSet;
