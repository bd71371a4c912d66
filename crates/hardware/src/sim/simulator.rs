//! Simulator: owns the harts, the shared `System` and the host interface.
//!
//! The simulator is strictly single-threaded. Concurrency among harts is an illusion
//! produced by [`Simulator::step_all`], which runs every hart for `interleave`
//! instructions in registration order, round after round. The only points where outside
//! influence is observed are batch boundaries:
//!
//! * the host interface is serviced at the start of every `step_all`,
//! * the running flag and the exit request are checked before every round,
//! * pending IPIs are delivered to a hart right before its next block, unless the hart
//!   still holds an untaken one.
//!
//! Nothing preempts a block that has started.

use crate::common::{HartSet, HostChannelError, SimError};
use crate::config::Config;
use crate::core::Hart;
use crate::soc::System;
use crate::soc::devices::{HostInterface, HostStatus};
use crate::stats::SimStats;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace};

/// Cloneable handle that asks a running simulator to stop at its next round boundary.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests termination of the run loop.
    pub fn stop(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Top-level multi-hart simulator.
pub struct Simulator {
    system: System,
    harts: Vec<Box<dyn Hart>>,
    host: Box<dyn HostInterface>,
    running: Arc<AtomicBool>,
    config: Config,
    stats: SimStats,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("harts", &self.harts.len())
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("exit_code", &self.system.exit_code())
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Builds the shared system from `config` and takes ownership of the harts.
    ///
    /// Harts are scheduled in the order given.
    ///
    /// # Errors
    ///
    /// [`SimError::DuplicateHart`] if two harts share an id, [`SimError::Config`] or
    /// [`SimError::Io`] if the system cannot be built.
    pub fn new(
        config: Config,
        harts: Vec<Box<dyn Hart>>,
        host: Box<dyn HostInterface>,
    ) -> Result<Self, SimError> {
        let mut ids = HartSet::new();
        for hart in &harts {
            if !ids.insert(hart.hart_id()) {
                return Err(SimError::DuplicateHart(hart.hart_id()));
            }
        }
        let system = System::new(&config)?;
        let stats = SimStats::new(harts.len());
        Ok(Self {
            system,
            harts,
            host,
            running: Arc::new(AtomicBool::new(true)),
            config,
            stats,
        })
    }

    /// Runs the simulation.
    ///
    /// Non-interactive mode advances all harts in batches of `general.batch_size`
    /// until the host requests an exit or [`stop`](Self::stop) is called. Interactive
    /// mode hands control to the console on stdin/stdout instead.
    ///
    /// Returns the exit code requested by the host, if any.
    ///
    /// # Errors
    ///
    /// [`SimError::NoHarts`] when there is nothing to run; otherwise the first hart
    /// fault, host handshake violation or console I/O error.
    pub fn run(&mut self, interactive: bool) -> Result<Option<u64>, SimError> {
        if self.harts.is_empty() {
            return Err(SimError::NoHarts);
        }
        if interactive {
            let stdin = io::stdin();
            self.run_console(stdin.lock(), io::stdout().lock())?;
        } else {
            let batch = self.config.general.batch_size;
            let interleave = self.config.general.interleave;
            let noisy = self.config.general.trace_instructions;
            while self.is_running() {
                self.step_all(batch, interleave, noisy)?;
            }
        }
        info!(exit_code = ?self.exit_code(), "simulation finished");
        Ok(self.exit_code())
    }

    /// Runs every hart for `total` instructions, `interleave` at a time.
    ///
    /// Each round steps every hart once, in registration order, by exactly
    /// `interleave` instructions; `total / interleave` rounds are run unless the
    /// simulation is stopped between rounds.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidInterleave`] if `interleave` is zero or does not divide
    /// `total`; nothing executes in that case. Otherwise the first hart fault.
    pub fn step_all(&mut self, total: usize, interleave: usize, noisy: bool) -> Result<(), SimError> {
        if interleave == 0 || total % interleave != 0 {
            return Err(SimError::InvalidInterleave { total, interleave });
        }
        self.relay_host()?;
        for _ in 0..total / interleave {
            if !self.is_running() {
                break;
            }
            for idx in 0..self.harts.len() {
                self.advance(idx, interleave, noisy)?;
            }
            self.stats.rounds += 1;
        }
        Ok(())
    }

    /// Runs the hart at registration index `idx` alone for `n` instructions.
    ///
    /// Like a round of [`step_all`](Self::step_all), the block is skipped once the
    /// simulation has stopped.
    ///
    /// # Errors
    ///
    /// [`SimError::NoSuchProcessor`] for a bad index, otherwise the hart's fault.
    pub fn step_proc(&mut self, idx: usize, n: usize, noisy: bool) -> Result<(), SimError> {
        if idx >= self.harts.len() {
            return Err(SimError::NoSuchProcessor {
                index: idx,
                count: self.harts.len(),
            });
        }
        self.relay_host()?;
        if !self.is_running() {
            return Ok(());
        }
        self.advance(idx, n, noisy)
    }

    fn advance(&mut self, idx: usize, n: usize, noisy: bool) -> Result<(), SimError> {
        let count = self.harts.len();
        let Some(hart) = self.harts.get_mut(idx) else {
            return Err(SimError::NoSuchProcessor { index: idx, count });
        };
        let id = hart.hart_id();
        if self.system.take_ipi(id) {
            if hart.ipi_pending() {
                debug!(hart = id, "IPI already latched; coalesced");
            } else {
                debug!(hart = id, "delivering IPI");
                hart.deliver_ipi();
                self.stats.ipis_delivered += 1;
            }
        }
        if noisy {
            trace!(hart = id, pc = hart.pc(), n, "step");
        }
        hart.step(n, noisy, &mut self.system)
            .map_err(|source| SimError::Hart { hart: id, source })?;
        self.stats.record_step(idx, n);
        Ok(())
    }

    /// Services the host interface once; an exit verdict is recorded in the
    /// system's exit request.
    ///
    /// # Errors
    ///
    /// Handshake violations raised by the host interface.
    pub fn relay_host(&mut self) -> Result<(), SimError> {
        self.stats.host_relays += 1;
        if let HostStatus::Exit(code) = self.host.tick(&mut self.system.host)? {
            self.system.request_exit(code);
        }
        Ok(())
    }

    /// Machine side: posts `value` to the host.
    ///
    /// # Errors
    ///
    /// [`HostChannelError::Overrun`] if the previous value is still unread.
    pub fn set_tohost(&mut self, value: u64) -> Result<(), HostChannelError> {
        self.system.set_tohost(value)
    }

    /// Machine side: consumes the host's reply, if one is pending.
    pub fn get_fromhost(&mut self) -> Option<u64> {
        self.system.get_fromhost()
    }

    /// Marks an IPI pending for `hart`; it is delivered right before that hart's
    /// next block.
    ///
    /// # Errors
    ///
    /// [`SimError::NoSuchHart`] if no registered hart has that id.
    pub fn send_ipi(&mut self, hart: u32) -> Result<(), SimError> {
        if !self.harts.iter().any(|h| h.hart_id() == hart) {
            return Err(SimError::NoSuchHart(hart));
        }
        debug!(hart, "IPI pending");
        self.system.send_ipi(hart);
        Ok(())
    }

    /// Number of registered harts.
    pub fn num_cores(&self) -> usize {
        self.harts.len()
    }

    /// Hart at registration index `idx`.
    pub fn hart(&self, idx: usize) -> Option<&(dyn Hart + 'static)> {
        self.harts.get(idx).map(Box::as_ref)
    }

    /// Requests termination; observed at the next round boundary.
    pub fn stop(&self) {
        info!("stop requested");
        self.running.store(false, Ordering::Relaxed);
    }

    /// Handle for stopping the simulator from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.running))
    }

    /// `true` until stopped or until the host requests an exit.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed) && self.system.exit_code().is_none()
    }

    /// Exit code requested by the host, if any.
    pub fn exit_code(&self) -> Option<u64> {
        self.system.exit_code()
    }

    /// Shared machine state.
    pub fn system(&self) -> &System {
        &self.system
    }

    /// Shared machine state, mutably.
    pub fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    /// Configuration the simulator was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scheduling statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }
}
