//! Error types for the simulation core.
//!
//! This module defines every failure the orchestrator can report. It provides:
//! 1. **Bus Errors:** Accesses that no device claims, or that fall outside a device window.
//! 2. **Host Channel Errors:** Single-slot handshake violations on `tohost`/`fromhost`.
//! 3. **Debug Module Errors:** Out-of-range word accesses into debug RAM.
//! 4. **Hart Errors:** Faults reported by a processor while it was stepping.
//! 5. **Simulator Errors:** Top-level failures, including rejected interleave requests.

use std::fmt;
use std::io;

use thiserror::Error;

/// Direction of a host channel slot, named from the simulated machine's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Machine to host (`tohost`).
    ToHost,
    /// Host to machine (`fromhost`).
    FromHost,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToHost => write!(f, "tohost"),
            Self::FromHost => write!(f, "fromhost"),
        }
    }
}

/// Failure of a physical memory access routed through the [`System`](crate::soc::System).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    /// No device claims `[addr, addr + len)`.
    #[error("unmapped access of {len} bytes at {addr:#x}")]
    Unmapped {
        /// First byte of the access.
        addr: u64,
        /// Access length in bytes.
        len: usize,
    },
    /// A NUL-terminated string ran off the end of mapped memory.
    #[error("unterminated string starting at {addr:#x}")]
    Unterminated {
        /// First byte of the string.
        addr: u64,
    },
}

/// Violation of the single-slot `tohost`/`fromhost` handshake.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HostChannelError {
    /// A post found the slot still holding a value nobody has consumed.
    ///
    /// The unread value is kept; `rejected` is the value that was refused.
    #[error("{direction} overrun: {unread:#x} still pending, rejected {rejected:#x}")]
    Overrun {
        /// Slot that was written.
        direction: Direction,
        /// Value still waiting in the slot.
        unread: u64,
        /// Value the writer tried to post.
        rejected: u64,
    },
}

/// Misuse of the Debug Module's word-indexed RAM accessors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DebugModuleError {
    /// Word index past the end of debug RAM.
    #[error("debug RAM word index {index} out of range (RAM holds {words} words)")]
    WordIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of 32-bit words in debug RAM.
        words: usize,
    },
}

/// Fault raised by a hart while executing a batch.
#[derive(Debug, Error)]
pub enum HartError {
    /// The hart touched memory nothing maps.
    #[error(transparent)]
    Bus(#[from] BusError),
    /// The hart violated the host channel handshake.
    #[error(transparent)]
    HostChannel(#[from] HostChannelError),
    /// Any other fatal condition reported by the processor model.
    #[error("fault at pc {pc:#x}: {reason}")]
    Fault {
        /// Program counter of the faulting instruction.
        pc: u64,
        /// Human readable cause.
        reason: String,
    },
}

/// Top-level error returned by the [`Simulator`](crate::sim::Simulator).
#[derive(Debug, Error)]
pub enum SimError {
    /// `step_all` was asked for a batch the interleave does not divide.
    #[error("interleave {interleave} does not divide {total} instructions")]
    InvalidInterleave {
        /// Instructions requested per hart.
        total: usize,
        /// Instructions per hart per round.
        interleave: usize,
    },
    /// No hart with the given id is registered.
    #[error("no hart with id {0}")]
    NoSuchHart(u32),
    /// No hart is registered at the given scheduling index.
    #[error("no processor {index} ({count} registered)")]
    NoSuchProcessor {
        /// Requested registration index.
        index: usize,
        /// Number of registered harts.
        count: usize,
    },
    /// Two registered harts report the same id.
    #[error("hart id {0} registered twice")]
    DuplicateHart(u32),
    /// The run loop was started without any hart to advance.
    #[error("no harts registered")]
    NoHarts,
    /// A hart faulted during its batch.
    #[error("hart {hart}: {source}")]
    Hart {
        /// Id of the faulting hart.
        hart: u32,
        /// Underlying fault.
        #[source]
        source: HartError,
    },
    /// The host interface tripped over the channel handshake.
    #[error(transparent)]
    HostChannel(#[from] HostChannelError),
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Memory allocation or console I/O failed.
    #[error("I/O: {0}")]
    Io(#[from] io::Error),
}

/// Failure to load or validate a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    /// The JSON did not match the configuration schema.
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values are individually well-formed but inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}
