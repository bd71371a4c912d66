//! Debug Module.
//!
//! The mailbox an external debugger uses to stage work for a halted hart. It holds
//! two independent pieces of state:
//!
//! * **Debug RAM:** a small scratch buffer reachable byte-wise through the [`Device`]
//!   window and word-wise through [`DebugModule::ram_read32`]/[`DebugModule::ram_write32`].
//!   Words are little-endian so both views agree on every host.
//! * **Interrupt set:** the harts currently being asked to enter debug mode.
//!
//! Halt/stage/resume sequencing is a protocol between the debugger and the hart;
//! this device only observes it as RAM traffic and interrupt set/clear calls.

use crate::common::constants::{DEBUG_RAM_SIZE, DEBUG_WORD_BYTES};
use crate::common::{DebugModuleError, HartSet};
use crate::soc::devices::Device;
use crate::soc::traits::window;
use tracing::debug;

/// Memory-mapped debug scratch RAM plus per-hart debug interrupt flags.
#[derive(Debug)]
pub struct DebugModule {
    base_addr: u64,
    ram: Vec<u8>,
    interrupt: HartSet,
}

impl DebugModule {
    /// Creates a module with [`DEBUG_RAM_SIZE`] bytes of RAM mapped at `base_addr`.
    pub fn new(base_addr: u64) -> Self {
        Self::with_ram_size(base_addr, DEBUG_RAM_SIZE)
    }

    /// Creates a module with `ram_size` bytes of RAM.
    ///
    /// `ram_size` is expected to be a multiple of 4; a trailing partial word is only
    /// reachable through the byte window.
    pub fn with_ram_size(base_addr: u64, ram_size: usize) -> Self {
        Self {
            base_addr,
            ram: vec![0; ram_size],
            interrupt: HartSet::new(),
        }
    }

    /// Size of debug RAM in bytes.
    pub fn ram_size(&self) -> usize {
        self.ram.len()
    }

    /// Number of addressable 32-bit words.
    pub fn ram_words(&self) -> usize {
        self.ram.len() / DEBUG_WORD_BYTES
    }

    fn word_range(&self, index: usize) -> Result<std::ops::Range<usize>, DebugModuleError> {
        if index >= self.ram_words() {
            return Err(DebugModuleError::WordIndexOutOfRange {
                index,
                words: self.ram_words(),
            });
        }
        let start = index * DEBUG_WORD_BYTES;
        Ok(start..start + DEBUG_WORD_BYTES)
    }

    /// Writes the 32-bit word at `index`.
    ///
    /// # Errors
    ///
    /// [`DebugModuleError::WordIndexOutOfRange`] if `index` is past the end of RAM.
    pub fn ram_write32(&mut self, index: usize, value: u32) -> Result<(), DebugModuleError> {
        let range = self.word_range(index)?;
        self.ram[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Reads the 32-bit word at `index`.
    ///
    /// # Errors
    ///
    /// [`DebugModuleError::WordIndexOutOfRange`] if `index` is past the end of RAM.
    pub fn ram_read32(&self, index: usize) -> Result<u32, DebugModuleError> {
        let range = self.word_range(index)?;
        let mut word = [0u8; DEBUG_WORD_BYTES];
        word.copy_from_slice(&self.ram[range]);
        Ok(u32::from_le_bytes(word))
    }

    /// Signals `hart` to enter debug mode.
    pub fn set_interrupt(&mut self, hart: u32) {
        debug!(hart, "set debug interrupt");
        let _ = self.interrupt.insert(hart);
    }

    /// Withdraws the debug request for `hart`.
    pub fn clear_interrupt(&mut self, hart: u32) {
        debug!(hart, "clear debug interrupt");
        let _ = self.interrupt.remove(hart);
    }

    /// Returns whether `hart` currently has a debug interrupt pending.
    pub fn get_interrupt(&self, hart: u32) -> bool {
        self.interrupt.contains(hart)
    }

    /// Harts with a pending debug interrupt, ascending.
    pub fn pending_interrupts(&self) -> impl Iterator<Item = u32> + '_ {
        self.interrupt.iter()
    }
}

impl Device for DebugModule {
    fn name(&self) -> &str {
        "DEBUG"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, self.ram.len() as u64)
    }

    fn load(&mut self, offset: u64, buf: &mut [u8]) -> bool {
        match window(offset, buf.len(), self.ram.len()) {
            Some(range) => {
                buf.copy_from_slice(&self.ram[range]);
                true
            }
            None => {
                debug!(offset, len = buf.len(), "debug RAM load outside window");
                false
            }
        }
    }

    fn store(&mut self, offset: u64, data: &[u8]) -> bool {
        match window(offset, data.len(), self.ram.len()) {
            Some(range) => {
                self.ram[range].copy_from_slice(data);
                true
            }
            None => {
                debug!(offset, len = data.len(), "debug RAM store outside window");
                false
            }
        }
    }
}
