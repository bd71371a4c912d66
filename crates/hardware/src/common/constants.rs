//! Global System Constants.
//!
//! This module defines constants shared by the devices and the orchestrator. It includes:
//! 1. **Debug Module Constants:** Debug RAM geometry.
//! 2. **Host Channel Constants:** The riscv-tests `tohost` result encoding.

/// Default size of the Debug Module's scratch RAM in bytes.
pub const DEBUG_RAM_SIZE: usize = 64;

/// Width of one debug RAM word in bytes.
pub const DEBUG_WORD_BYTES: usize = 4;

/// `tohost` value reporting a passing test.
pub const TOHOST_PASS: u64 = 1;
