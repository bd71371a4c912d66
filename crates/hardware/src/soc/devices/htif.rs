//! Host-Target Interface (HTIF) channel.
//!
//! The simulated machine and the controlling host exchange single machine words over
//! two slots:
//!
//! * `tohost`: written by the machine, consumed by the host.
//! * `fromhost`: written by the host, consumed by the machine.
//!
//! Each slot is a one-deep [`Mailbox`]. A post into a slot whose previous value has not
//! been consumed is a protocol violation and is rejected with
//! [`HostChannelError::Overrun`]; the unread value survives.
//!
//! The host side is an external collaborator implementing [`HostInterface`]. It only ever
//! sees the channel through the two-method [`HostPort`] view. [`Htif`] is the stock
//! implementation for bare-metal test suites:
//!
//! * `0`: ignored (tests poll-write zero before writing the real value).
//! * `1`: test passed (exit code 0).
//! * Odd and not 1: test failed; the failing test number is `value >> 1`.
//! * Even and non-zero: a device command this interface does not service; the raw value
//!   becomes the exit code so the simulation stops rather than spinning.

use crate::common::constants::TOHOST_PASS;
use crate::common::{Direction, HostChannelError};
use tracing::{info, warn};

/// One-deep mailbox with pending tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mailbox {
    direction: Direction,
    value: u64,
    pending: bool,
}

impl Mailbox {
    /// Creates an empty mailbox for `direction`.
    pub const fn new(direction: Direction) -> Self {
        Self {
            direction,
            value: 0,
            pending: false,
        }
    }

    /// Deposits `value`.
    ///
    /// # Errors
    ///
    /// [`HostChannelError::Overrun`] if the previous value is still unread.
    pub fn post(&mut self, value: u64) -> Result<(), HostChannelError> {
        if self.pending {
            return Err(HostChannelError::Overrun {
                direction: self.direction,
                unread: self.value,
                rejected: value,
            });
        }
        self.value = value;
        self.pending = true;
        Ok(())
    }

    /// Consumes the pending value, if any. A second call without an intervening
    /// [`post`](Self::post) returns `None`.
    pub fn take(&mut self) -> Option<u64> {
        if self.pending {
            self.pending = false;
            Some(self.value)
        } else {
            None
        }
    }

    /// The most recently posted value, consumed or not. Does not change state.
    pub const fn latest(&self) -> u64 {
        self.value
    }

    /// Whether a posted value is waiting to be consumed.
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Host side of the channel as seen by a [`HostInterface`].
pub trait HostPort {
    /// Consumes the machine's pending `tohost` value.
    fn take_tohost(&mut self) -> Option<u64>;

    /// Delivers a reply into `fromhost`.
    ///
    /// # Errors
    ///
    /// [`HostChannelError::Overrun`] if the machine has not read the previous reply.
    fn post_fromhost(&mut self, value: u64) -> Result<(), HostChannelError>;
}

/// Both slots of the handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostChannel {
    /// Machine to host.
    pub tohost: Mailbox,
    /// Host to machine.
    pub fromhost: Mailbox,
}

impl Default for HostChannel {
    fn default() -> Self {
        Self {
            tohost: Mailbox::new(Direction::ToHost),
            fromhost: Mailbox::new(Direction::FromHost),
        }
    }
}

impl HostChannel {
    /// Creates a channel with both slots empty.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostPort for HostChannel {
    fn take_tohost(&mut self) -> Option<u64> {
        self.tohost.take()
    }

    fn post_fromhost(&mut self, value: u64) -> Result<(), HostChannelError> {
        self.fromhost.post(value)
    }
}

/// Verdict of one host service pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostStatus {
    /// Keep simulating.
    Running,
    /// The host asks the simulation to end with this exit code.
    Exit(u64),
}

/// The controlling host process, serviced at every batch boundary.
pub trait HostInterface: Send {
    /// Handles whatever the machine has posted and optionally replies.
    ///
    /// # Errors
    ///
    /// Handshake violations while replying.
    fn tick(&mut self, port: &mut dyn HostPort) -> Result<HostStatus, HostChannelError>;
}

/// riscv-tests style host: turns `tohost` writes into exit codes.
#[derive(Debug, Default)]
pub struct Htif;

impl Htif {
    /// Creates the interface.
    pub const fn new() -> Self {
        Self
    }

    fn handle_tohost(val: u64) -> HostStatus {
        if val == 0 {
            return HostStatus::Running;
        }
        if val == TOHOST_PASS {
            info!("HTIF: PASS");
            HostStatus::Exit(0)
        } else if val & 1 != 0 {
            let test_num = val >> 1;
            warn!(test_num, tohost = val, "HTIF: FAIL");
            HostStatus::Exit(test_num)
        } else {
            warn!(tohost = val, "HTIF: unhandled tohost command");
            HostStatus::Exit(val)
        }
    }
}

impl HostInterface for Htif {
    fn tick(&mut self, port: &mut dyn HostPort) -> Result<HostStatus, HostChannelError> {
        Ok(port
            .take_tohost()
            .map_or(HostStatus::Running, Self::handle_tohost))
    }
}
