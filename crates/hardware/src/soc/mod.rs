//! System components.
//!
//! This module organizes the machine state shared by the harts: main memory,
//! the Debug Module, the HTIF host channel, and the `System` that routes
//! physical accesses between them.

/// System construction and access routing.
pub mod builder;

/// Debug Module and host channel.
pub mod devices;

/// Shared main memory.
pub mod memory;

/// Device trait definitions for MMIO access.
pub mod traits;

pub use builder::{ExitRequest, System};
