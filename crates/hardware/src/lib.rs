//! Multi-hart RISC-V simulation core.
//!
//! This crate orchestrates a set of harts over shared machine state. It provides:
//! 1. **Scheduling:** Round-robin interleaved stepping with deterministic batch boundaries.
//! 2. **Host channel:** Single-slot `tohost`/`fromhost` mailboxes and an HTIF-style host.
//! 3. **Debug module:** Little-endian debug RAM and per-hart debug interrupt lines.
//! 4. **SoC:** Main memory plus MMIO routing through a shared `System`.
//! 5. **Console:** An interactive command loop for stepping and inspecting harts.
//!
//! Hart execution itself is pluggable through the [`Hart`] trait.

/// Common types and constants (errors, hart sets, debug RAM geometry).
pub mod common;
/// Simulator configuration (defaults, validation, JSON loading).
pub mod config;
/// The hart abstraction the simulator schedules.
pub mod core;
/// Register naming for console input.
pub mod isa;
/// Simulator run loop and interactive console.
pub mod sim;
/// System-on-chip (memory, debug module, host channel, routing).
pub mod soc;
/// Orchestrator statistics.
pub mod stats;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Execution contract implemented by hart models.
pub use crate::core::Hart;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::Simulator;
/// Shared machine state; constructed by the simulator from its `Config`.
pub use crate::soc::System;
