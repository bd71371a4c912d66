//! Simulation statistics collection and reporting.
//!
//! This module tracks what the orchestrator did, not what the harts computed. It provides:
//! 1. **Per-hart progress:** Instructions handed to each hart, in registration order.
//! 2. **Scheduling:** Completed `step_all` rounds and host channel relays.
//! 3. **Signalling:** IPIs delivered at batch boundaries.

use std::time::Instant;

/// Orchestrator statistics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Instructions stepped per hart, indexed by registration order.
    pub instructions: Vec<u64>,
    /// Completed interleave rounds.
    pub rounds: u64,
    /// Host interface service passes.
    pub host_relays: u64,
    /// IPIs delivered to harts.
    pub ipis_delivered: u64,
}

impl SimStats {
    /// Creates zeroed statistics for `harts` harts.
    pub fn new(harts: usize) -> Self {
        Self {
            start_time: Instant::now(),
            instructions: vec![0; harts],
            rounds: 0,
            host_relays: 0,
            ipis_delivered: 0,
        }
    }

    /// Credits `n` instructions to the hart at registration index `idx`.
    pub fn record_step(&mut self, idx: usize, n: usize) {
        if let Some(count) = self.instructions.get_mut(idx) {
            *count += n as u64;
        }
    }

    /// Sum over all harts.
    pub fn total_instructions(&self) -> u64 {
        self.instructions.iter().sum()
    }

    /// Prints a summary to stdout.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let total = self.total_instructions();
        let mips = if seconds > 0.0 {
            (total as f64 / seconds) / 1_000_000.0
        } else {
            0.0
        };
        println!("\n==========================================================");
        println!("MULTI-HART SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("sim_insts                {total}");
        println!("sim_mips                 {mips:.2}");
        println!("sim_rounds               {}", self.rounds);
        println!("host_relays              {}", self.host_relays);
        println!("ipis_delivered           {}", self.ipis_delivered);
        println!("----------------------------------------------------------");
        for (idx, count) in self.instructions.iter().enumerate() {
            println!("  hart[{idx}].insts          {count}");
        }
        println!("==========================================================");
    }
}
