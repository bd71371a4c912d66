//! Host interface that answers every `tohost` value with `value + 1`.

use hartsim_core::common::HostChannelError;
use hartsim_core::soc::devices::{HostInterface, HostPort, HostStatus};
use std::sync::{Arc, Mutex};

/// Every `tohost` value the host consumed, in order.
pub type Seen = Arc<Mutex<Vec<u64>>>;

pub struct EchoHost {
    seen: Seen,
    exit_on: Option<(u64, u64)>,
}

impl EchoHost {
    pub fn new(seen: &Seen) -> Self {
        Self {
            seen: Arc::clone(seen),
            exit_on: None,
        }
    }

    /// Requests exit with `code` instead of replying when `value` arrives.
    pub fn exiting_on(mut self, value: u64, code: u64) -> Self {
        self.exit_on = Some((value, code));
        self
    }
}

impl HostInterface for EchoHost {
    fn tick(&mut self, port: &mut dyn HostPort) -> Result<HostStatus, HostChannelError> {
        let Some(value) = port.take_tohost() else {
            return Ok(HostStatus::Running);
        };
        self.seen.lock().unwrap().push(value);
        if let Some((_, code)) = self.exit_on.filter(|&(on, _)| on == value) {
            return Ok(HostStatus::Exit(code));
        }
        port.post_fromhost(value + 1)?;
        Ok(HostStatus::Running)
    }
}
