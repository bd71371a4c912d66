//! Instruction-set naming conventions.
//!
//! Only the register naming used by the console lives here; instruction
//! decode and execution belong to the hart implementations.

/// ABI register names and lookup.
pub mod abi;
