//! Configuration system for the simulation orchestrator.
//!
//! This module defines all configuration structures used to parameterize the simulator.
//! It provides:
//! 1. **Defaults:** Baseline memory map, debug RAM geometry and scheduling constants.
//! 2. **Structures:** Hierarchical config for general scheduling, memory, debug and console.
//! 3. **Loading:** JSON deserialization from a string or a file, followed by validation.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a valid configuration.

use crate::common::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default configuration constants for the simulator.
mod defaults {
    /// Instructions each hart runs before the next one is scheduled.
    pub const INTERLEAVE: usize = 1_000;

    /// Instructions each hart runs per batch of the non-interactive run loop.
    ///
    /// The host channel and the stop flag are serviced between batches, so this
    /// bounds the latency of `stop()` and of host-requested exits.
    pub const BATCH_SIZE: usize = 10_000;

    /// Base address of main memory (2 GiB).
    pub const RAM_BASE: u64 = 0x8000_0000;

    /// Size of main memory (128 MiB).
    pub const RAM_SIZE: usize = 128 * 1024 * 1024;

    /// Base address of the Debug Module window.
    pub const DEBUG_BASE: u64 = 0x0;

    /// Debug RAM size in bytes.
    pub const DEBUG_RAM_SIZE: usize = crate::common::DEBUG_RAM_SIZE;

    /// Console prompt.
    pub const PROMPT: &str = ": ";

    /// Instructions between condition checks in `until`/`while`.
    pub const POLL_INTERVAL: usize = 1;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use hartsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.general.interleave, 1_000);
/// assert_eq!(config.memory.base, 0x8000_0000);
/// ```
///
/// Deserializing from JSON; omitted fields keep their defaults:
///
/// ```
/// use hartsim_core::config::Config;
///
/// let json = r#"{
///     "general": { "interleave": 4, "batch_size": 12, "trace_instructions": true },
///     "memory": { "size": 65536 },
///     "debug": { "ram_size": 128 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.general.interleave, 4);
/// assert_eq!(config.memory.size, 65536);
/// assert_eq!(config.memory.base, 0x8000_0000);
/// assert_eq!(config.debug.ram_size, 128);
/// assert_eq!(config.console.prompt, ": ");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduling and tracing.
    pub general: GeneralConfig,
    /// Main memory placement.
    pub memory: MemoryConfig,
    /// Debug Module placement and size.
    pub debug: DebugConfig,
    /// Interactive console behaviour.
    pub console: ConsoleConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed JSON, [`ConfigError::Invalid`] on
    /// inconsistent values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks the cross-field invariants.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let general = &self.general;
        if general.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "general.batch_size must be non-zero".into(),
            ));
        }
        if general.interleave == 0 || general.batch_size % general.interleave != 0 {
            return Err(ConfigError::Invalid(format!(
                "interleave {} must be non-zero and divide batch_size {}",
                general.interleave, general.batch_size
            )));
        }
        if self.memory.size == 0 {
            return Err(ConfigError::Invalid("memory.size must be non-zero".into()));
        }
        let ram_size = self.debug.ram_size;
        if ram_size == 0 || ram_size % 4 != 0 {
            return Err(ConfigError::Invalid(format!(
                "debug.ram_size {ram_size} must be a non-zero multiple of 4"
            )));
        }
        if self.console.poll_interval == 0 {
            return Err(ConfigError::Invalid(
                "console.poll_interval must be non-zero".into(),
            ));
        }

        let mem = (self.memory.base, self.memory.size as u64);
        let dbg = (self.debug.base, ram_size as u64);
        for (name, (base, size)) in [("memory", mem), ("debug", dbg)] {
            if base.checked_add(size).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "{name} window at {base:#x} wraps the address space"
                )));
            }
        }
        if mem.0 < dbg.0 + dbg.1 && dbg.0 < mem.0 + mem.1 {
            return Err(ConfigError::Invalid(format!(
                "debug window {:#x}..{:#x} overlaps memory {:#x}..{:#x}",
                dbg.0,
                dbg.0 + dbg.1,
                mem.0,
                mem.0 + mem.1
            )));
        }
        Ok(())
    }
}

/// Scheduling and tracing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Instructions per hart per round of `step_all`.
    #[serde(default = "GeneralConfig::default_interleave")]
    pub interleave: usize,

    /// Instructions per hart per batch of the non-interactive run loop.
    #[serde(default = "GeneralConfig::default_batch_size")]
    pub batch_size: usize,

    /// Trace every executed instruction in the non-interactive run loop.
    #[serde(default)]
    pub trace_instructions: bool,
}

impl GeneralConfig {
    fn default_interleave() -> usize {
        defaults::INTERLEAVE
    }

    fn default_batch_size() -> usize {
        defaults::BATCH_SIZE
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interleave: defaults::INTERLEAVE,
            batch_size: defaults::BATCH_SIZE,
            trace_instructions: false,
        }
    }
}

/// Main memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Physical base address.
    #[serde(default = "MemoryConfig::default_base")]
    pub base: u64,

    /// Size in bytes.
    #[serde(default = "MemoryConfig::default_size")]
    pub size: usize,
}

impl MemoryConfig {
    fn default_base() -> u64 {
        defaults::RAM_BASE
    }

    fn default_size() -> usize {
        defaults::RAM_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base: defaults::RAM_BASE,
            size: defaults::RAM_SIZE,
        }
    }
}

/// Debug Module configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DebugConfig {
    /// Physical base address of the debug RAM window.
    #[serde(default = "DebugConfig::default_base")]
    pub base: u64,

    /// Debug RAM size in bytes (multiple of 4).
    #[serde(default = "DebugConfig::default_ram_size")]
    pub ram_size: usize,
}

impl DebugConfig {
    fn default_base() -> u64 {
        defaults::DEBUG_BASE
    }

    fn default_ram_size() -> usize {
        defaults::DEBUG_RAM_SIZE
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            base: defaults::DEBUG_BASE,
            ram_size: defaults::DEBUG_RAM_SIZE,
        }
    }
}

/// Interactive console configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Prompt printed before each command.
    #[serde(default = "ConsoleConfig::default_prompt")]
    pub prompt: String,

    /// Instructions stepped between checks of an `until`/`while` condition.
    #[serde(default = "ConsoleConfig::default_poll_interval")]
    pub poll_interval: usize,
}

impl ConsoleConfig {
    fn default_prompt() -> String {
        defaults::PROMPT.to_string()
    }

    fn default_poll_interval() -> usize {
        defaults::POLL_INTERVAL
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: defaults::PROMPT.to_string(),
            poll_interval: defaults::POLL_INTERVAL,
        }
    }
}
