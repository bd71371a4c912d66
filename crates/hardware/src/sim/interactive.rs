//! Interactive introspection console.
//!
//! A line-oriented command loop layered on top of [`Simulator`]. Each line is parsed into
//! a [`Command`] and dispatched; stepping commands go through the same `step_all` path as
//! the batch run loop, inspection commands read hart state or the shared memory region.
//!
//! Input errors (unknown verb, wrong arity, bad number, unknown register, unmapped
//! address) are printed as `error: ...` and the prompt returns; simulator state is left
//! as it was. Only hart faults and I/O errors leave the loop.
//!
//! Counts, processor ids and poll intervals are decimal. Addresses and comparison values are hexadecimal,
//! with or without a `0x` prefix. An empty line steps every hart one instruction.

use crate::common::{BusError, SimError};
use crate::core::Hart;
use crate::isa::abi::{fpr_index, xpr_index};
use crate::sim::Simulator;
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::{info, warn};

const HELP: &str = "\
commands:
  <enter>                       step every hart one instruction (noisy)
  run|r [count]                 step every hart, tracing (forever without count)
  rs [count]                    step every hart silently
  run_proc <proc> [count]       step one hart, tracing
  rs_proc <proc> [count]        step one hart silently
  reg <proc> <reg>              print an integer register
  fregs|fregd <proc> <reg>      print a float register as single/double
  pc <proc>                     print the program counter
  mem <addr>                    print the memory word at addr (width follows alignment)
  str <addr>                    print the NUL-terminated string at addr
  until|while reg <proc> <reg> <value> [interval]
  until|while pc <proc> <value> [interval]
  until|while mem <addr> <value> [interval]
  until|while tohost <value> [interval]
                                step until the value matches (until) or differs (while),
                                sampling every [interval] instructions
  quit|q                        leave the simulator";

/// Malformed or inapplicable console input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The verb is not recognised.
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    /// Wrong number or shape of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
    /// An argument that should be a number is not.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    /// The register name is not an ABI name, `xN`/`fN`, or an index below 32.
    #[error("unknown register `{0}`")]
    UnknownRegister(String),
    /// The processor index is out of range.
    #[error("no processor {index} ({count} registered)")]
    NoSuchProcessor {
        /// Requested index.
        index: usize,
        /// Number of registered harts.
        count: usize,
    },
    /// A polling interval of zero instructions.
    #[error("poll interval must be non-zero")]
    ZeroInterval,
    /// The address is not mapped.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// How `fregs`/`fregd` interpret register bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatWidth {
    /// Low 32 bits as `f32`.
    Single,
    /// All 64 bits as `f64`.
    Double,
}

/// Quantity sampled by `until`/`while`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Integer register of a hart.
    Reg {
        /// Processor index.
        proc: usize,
        /// Register index.
        reg: usize,
    },
    /// Program counter of a hart.
    Pc {
        /// Processor index.
        proc: usize,
    },
    /// Aligned memory word.
    Mem {
        /// Physical address.
        addr: u64,
    },
    /// Latest value the machine posted to `tohost`.
    ToHost,
}

/// Whether polling stops on equality or on inequality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollMode {
    /// Step until the sampled value equals the target.
    Until,
    /// Step while the sampled value equals the target.
    While,
}

/// A parsed console command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Stop the simulation.
    Quit,
    /// Print the command summary.
    Help,
    /// Step every hart; `None` runs until stopped.
    Run {
        /// Instructions per hart.
        count: Option<usize>,
        /// Trace instructions.
        noisy: bool,
    },
    /// Step a single hart; `None` runs until stopped.
    RunProc {
        /// Processor index.
        proc: usize,
        /// Instructions to run.
        count: Option<usize>,
        /// Trace instructions.
        noisy: bool,
    },
    /// Print an integer register.
    Reg {
        /// Processor index.
        proc: usize,
        /// Register index.
        reg: usize,
    },
    /// Print a floating-point register.
    Freg {
        /// Processor index.
        proc: usize,
        /// Register index.
        reg: usize,
        /// Interpretation of the bits.
        width: FloatWidth,
    },
    /// Print the program counter.
    Pc {
        /// Processor index.
        proc: usize,
    },
    /// Print the memory word at an address.
    Mem {
        /// Physical address.
        addr: u64,
    },
    /// Print a NUL-terminated string.
    Str {
        /// Physical address.
        addr: u64,
    },
    /// Step until a condition holds.
    Until {
        /// What to sample.
        condition: Condition,
        /// Target value.
        value: u64,
        /// Stop on equality or inequality.
        mode: PollMode,
        /// Instructions between samples; `console.poll_interval` when `None`.
        interval: Option<usize>,
    },
}

fn arity(
    args: &[&str],
    allowed: RangeInclusive<usize>,
    usage: &'static str,
) -> Result<(), CommandError> {
    if allowed.contains(&args.len()) {
        Ok(())
    } else {
        Err(CommandError::Usage(usage))
    }
}

fn parse_dec(s: &str) -> Result<usize, CommandError> {
    s.parse()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

fn parse_hex(s: &str) -> Result<u64, CommandError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

fn parse_xreg(s: &str) -> Result<usize, CommandError> {
    xpr_index(s).ok_or_else(|| CommandError::UnknownRegister(s.to_string()))
}

impl Command {
    /// Parses one console line. An empty line is a single noisy step.
    ///
    /// # Errors
    ///
    /// [`CommandError`] describing what is wrong with the line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Self::Run {
                count: Some(1),
                noisy: true,
            });
        };
        let args: Vec<&str> = words.collect();

        match verb {
            "quit" | "q" => {
                arity(&args, 0..=0, "quit")?;
                Ok(Self::Quit)
            }
            "help" | "h" => Ok(Self::Help),
            "run" | "r" | "rs" => {
                arity(&args, 0..=1, "run|rs [count]")?;
                Ok(Self::Run {
                    count: args.first().map(|s| parse_dec(s)).transpose()?,
                    noisy: verb != "rs",
                })
            }
            "run_proc" | "rs_proc" => {
                arity(&args, 1..=2, "run_proc|rs_proc <proc> [count]")?;
                Ok(Self::RunProc {
                    proc: parse_dec(args[0])?,
                    count: args.get(1).map(|s| parse_dec(s)).transpose()?,
                    noisy: verb == "run_proc",
                })
            }
            "reg" => {
                arity(&args, 2..=2, "reg <proc> <reg>")?;
                Ok(Self::Reg {
                    proc: parse_dec(args[0])?,
                    reg: parse_xreg(args[1])?,
                })
            }
            "fregs" | "fregd" => {
                arity(&args, 2..=2, "fregs|fregd <proc> <reg>")?;
                Ok(Self::Freg {
                    proc: parse_dec(args[0])?,
                    reg: fpr_index(args[1])
                        .ok_or_else(|| CommandError::UnknownRegister(args[1].to_string()))?,
                    width: if verb == "fregs" {
                        FloatWidth::Single
                    } else {
                        FloatWidth::Double
                    },
                })
            }
            "pc" => {
                arity(&args, 1..=1, "pc <proc>")?;
                Ok(Self::Pc {
                    proc: parse_dec(args[0])?,
                })
            }
            "mem" => {
                arity(&args, 1..=1, "mem <addr>")?;
                Ok(Self::Mem {
                    addr: parse_hex(args[0])?,
                })
            }
            "str" => {
                arity(&args, 1..=1, "str <addr>")?;
                Ok(Self::Str {
                    addr: parse_hex(args[0])?,
                })
            }
            "until" | "while" => {
                let mode = if verb == "until" {
                    PollMode::Until
                } else {
                    PollMode::While
                };
                Self::parse_until(&args, mode)
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    fn parse_until(args: &[&str], mode: PollMode) -> Result<Self, CommandError> {
        const USAGE: &str = "until|while <condition> <value> [interval]; condition is reg <proc> <reg> | pc <proc> | mem <addr> | tohost";
        let (condition, value, trailing) = match args {
            ["reg", proc, reg, value, trailing @ ..] => (
                Condition::Reg {
                    proc: parse_dec(proc)?,
                    reg: parse_xreg(reg)?,
                },
                value,
                trailing,
            ),
            ["pc", proc, value, trailing @ ..] => (
                Condition::Pc {
                    proc: parse_dec(proc)?,
                },
                value,
                trailing,
            ),
            ["mem", addr, value, trailing @ ..] => (
                Condition::Mem {
                    addr: parse_hex(addr)?,
                },
                value,
                trailing,
            ),
            ["tohost", value, trailing @ ..] => (Condition::ToHost, value, trailing),
            _ => return Err(CommandError::Usage(USAGE)),
        };
        let interval = match trailing {
            [] => None,
            [n] => match parse_dec(n)? {
                0 => return Err(CommandError::ZeroInterval),
                n => Some(n),
            },
            _ => return Err(CommandError::Usage(USAGE)),
        };
        Ok(Self::Until {
            condition,
            value: parse_hex(value)?,
            mode,
            interval,
        })
    }
}

/// Outcome of a console command that did not succeed.
enum ConsoleError {
    /// Reported to the operator; the loop continues.
    Input(CommandError),
    /// Leaves the loop.
    Fatal(SimError),
}

impl From<CommandError> for ConsoleError {
    fn from(e: CommandError) -> Self {
        Self::Input(e)
    }
}

impl From<BusError> for ConsoleError {
    fn from(e: BusError) -> Self {
        Self::Input(CommandError::Bus(e))
    }
}

impl From<SimError> for ConsoleError {
    fn from(e: SimError) -> Self {
        Self::Fatal(e)
    }
}

impl From<io::Error> for ConsoleError {
    fn from(e: io::Error) -> Self {
        Self::Fatal(SimError::Io(e))
    }
}

impl Simulator {
    /// Runs the console until `quit`, end of input, or the simulation stops.
    ///
    /// End of input stops the simulator.
    ///
    /// # Errors
    ///
    /// Hart faults and I/O errors on `input`/`output`. Malformed commands are reported
    /// on `output` and never returned.
    pub fn run_console<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<(), SimError> {
        let mut line = String::new();
        while self.is_running() {
            write!(output, "{}", self.config().console.prompt)?;
            output.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                info!("console input closed");
                self.stop();
                break;
            }
            let result = match Command::parse(line.trim()) {
                Ok(cmd) => self.execute(cmd, &mut output),
                Err(e) => Err(ConsoleError::Input(e)),
            };
            match result {
                Ok(()) => {}
                Err(ConsoleError::Input(e)) => {
                    warn!(error = %e, "console command rejected");
                    writeln!(output, "error: {e}")?;
                }
                Err(ConsoleError::Fatal(e)) => return Err(e),
            }
        }
        Ok(())
    }

    fn hart_at(&self, proc: usize) -> Result<&(dyn Hart + 'static), CommandError> {
        self.hart(proc).ok_or(CommandError::NoSuchProcessor {
            index: proc,
            count: self.num_cores(),
        })
    }

    fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<(), ConsoleError> {
        let interleave = self.config().general.interleave;
        match cmd {
            Command::Quit => self.stop(),
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Run {
                count: Some(n),
                noisy,
            } => self.step_all(n, 1, noisy)?,
            Command::Run { count: None, noisy } => {
                while self.is_running() {
                    self.step_all(interleave, interleave, noisy)?;
                }
            }
            Command::RunProc { proc, count, noisy } => {
                let _ = self.hart_at(proc)?;
                match count {
                    Some(n) => self.step_proc(proc, n, noisy)?,
                    None => {
                        while self.is_running() {
                            self.step_proc(proc, interleave, noisy)?;
                        }
                    }
                }
            }
            Command::Reg { proc, reg } => {
                let value = self.hart_at(proc)?.read_xreg(reg);
                writeln!(out, "{value:#018x}")?;
            }
            Command::Freg { proc, reg, width } => {
                let bits = self.hart_at(proc)?.read_freg(reg);
                match width {
                    FloatWidth::Single => writeln!(out, "{}", f32::from_bits(bits as u32))?,
                    FloatWidth::Double => writeln!(out, "{}", f64::from_bits(bits))?,
                }
            }
            Command::Pc { proc } => {
                let pc = self.hart_at(proc)?.pc();
                writeln!(out, "{pc:#018x}")?;
            }
            Command::Mem { addr } => {
                let value = self.system_mut().read_aligned(addr)?;
                writeln!(out, "{value:#018x}")?;
            }
            Command::Str { addr } => {
                let text = self.system_mut().read_cstr(addr)?;
                writeln!(out, "{text}")?;
            }
            Command::Until {
                condition,
                value,
                mode,
                interval,
            } => {
                let poll = interval.unwrap_or(self.config().console.poll_interval);
                self.poll_until(condition, value, mode, poll)?;
            }
        }
        Ok(())
    }

    fn sample(&mut self, condition: Condition) -> Result<u64, ConsoleError> {
        Ok(match condition {
            Condition::Reg { proc, reg } => self.hart_at(proc)?.read_xreg(reg),
            Condition::Pc { proc } => self.hart_at(proc)?.pc(),
            Condition::Mem { addr } => self.system_mut().read_aligned(addr)?,
            Condition::ToHost => self.system().host.tohost.latest(),
        })
    }

    fn poll_until(
        &mut self,
        condition: Condition,
        value: u64,
        mode: PollMode,
        poll: usize,
    ) -> Result<(), ConsoleError> {
        while self.is_running() {
            let current = self.sample(condition)?;
            let done = match mode {
                PollMode::Until => current == value,
                PollMode::While => current != value,
            };
            if done {
                break;
            }
            self.step_all(poll, poll, false)?;
        }
        Ok(())
    }
}
