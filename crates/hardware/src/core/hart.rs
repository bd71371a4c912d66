//! Processor interface.
//!
//! A hart is an external collaborator: the orchestrator never decodes or executes
//! instructions itself. It only asks a hart to run a block of instructions against the
//! shared [`System`], delivers IPIs between blocks, and reads architectural state for
//! the console.

use crate::common::HartError;
use crate::soc::System;

/// A simulated hardware thread.
pub trait Hart: Send {
    /// Hart id; unique within a simulator.
    fn hart_id(&self) -> u32;

    /// Executes exactly `n` instructions against `system`.
    ///
    /// When `noisy` is set the hart traces each instruction it executes. Tracing
    /// must not change what gets executed.
    ///
    /// # Errors
    ///
    /// Any fault the hart cannot handle architecturally; the run loop stops.
    fn step(&mut self, n: usize, noisy: bool, system: &mut System) -> Result<(), HartError>;

    /// Latches an inter-processor interrupt.
    fn deliver_ipi(&mut self);

    /// Whether a delivered IPI has not been taken yet.
    ///
    /// The simulator does not deliver another IPI while this is `true`.
    fn ipi_pending(&self) -> bool;

    /// Current program counter.
    fn pc(&self) -> u64;

    /// Integer register `idx` (0-31).
    fn read_xreg(&self, idx: usize) -> u64;

    /// Raw bits of floating-point register `idx` (0-31).
    fn read_freg(&self, idx: usize) -> u64;
}
