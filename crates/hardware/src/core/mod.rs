//! Processor core interface.
//!
//! Instruction semantics live outside this crate; this module only defines the
//! [`Hart`] contract the orchestrator drives.

/// The `Hart` trait.
pub mod hart;

pub use hart::Hart;
