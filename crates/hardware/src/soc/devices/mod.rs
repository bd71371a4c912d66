//! Memory-Mapped Devices and Host Collaborators.
//!
//! This module contains the Debug Module (debug RAM mailbox and per-hart debug
//! interrupts) and the HTIF host channel used to talk to the controlling host.

/// Debug Module (scratch RAM and debug interrupt set).
pub mod debug_module;

/// Host-Target Interface (`tohost`/`fromhost` handshake).
pub mod htif;

pub use debug_module::DebugModule;
pub use htif::{HostChannel, HostInterface, HostPort, HostStatus, Htif, Mailbox};

pub use crate::soc::traits::Device;
