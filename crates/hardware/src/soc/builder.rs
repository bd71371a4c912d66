//! System construction and the top-level `System` type.
//!
//! `System` is the machine state shared by every hart: main memory, the Debug Module,
//! the host channel, the inter-processor interrupts waiting for delivery and the exit
//! request. It performs:
//! 1. **Construction:** Builds memory and the Debug Module from [`Config`].
//! 2. **Access routing:** Physical loads and stores are offered to each device in turn;
//!    a device that does not own the range declines and the next one is tried.
//! 3. **Host handshake:** Machine-side `tohost`/`fromhost` accessors.
//! 4. **Signalling:** IPI requests and the exit request shared with the run loop.

use crate::common::{BusError, HartSet, HostChannelError, SimError};
use crate::config::Config;
use crate::soc::devices::{DebugModule, Device, HostChannel};
use crate::soc::memory::MemoryRegion;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::info;

/// Exit verdict posted by the host, shared with the run loop.
///
/// The flag is separate from the code so every `u64` is a valid exit code.
#[derive(Debug, Default)]
pub struct ExitRequest {
    requested: AtomicBool,
    code: AtomicU64,
}

impl ExitRequest {
    /// Records `code`; a later request replaces it.
    pub fn request(&self, code: u64) {
        self.code.store(code, Ordering::Relaxed);
        self.requested.store(true, Ordering::Release);
    }

    /// The requested exit code, if any.
    pub fn code(&self) -> Option<u64> {
        self.requested
            .load(Ordering::Acquire)
            .then(|| self.code.load(Ordering::Relaxed))
    }
}

/// Machine state shared between harts and the orchestrator.
#[derive(Debug)]
pub struct System {
    /// Main memory, shared by every hart.
    pub memory: MemoryRegion,
    /// Debug scratch RAM and debug interrupt set.
    pub debug: DebugModule,
    /// `tohost`/`fromhost` slots.
    pub host: HostChannel,
    /// IPIs raised but not yet delivered.
    ipis: HartSet,
    /// Exit code requested by the host.
    pub exit_request: Arc<ExitRequest>,
}

impl System {
    /// Builds memory and the Debug Module described by `config`.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] if the configuration is inconsistent, [`SimError::Io`] if
    /// the memory region cannot be allocated.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        config.validate()?;
        let memory = MemoryRegion::new(config.memory.base, config.memory.size)?;
        let debug = DebugModule::with_ram_size(config.debug.base, config.debug.ram_size);
        Ok(Self {
            memory,
            debug,
            host: HostChannel::new(),
            ipis: HartSet::new(),
            exit_request: Arc::new(ExitRequest::default()),
        })
    }

    fn devices_mut(&mut self) -> [&mut dyn Device; 2] {
        [&mut self.memory, &mut self.debug]
    }

    /// Reads `buf.len()` bytes at physical address `addr`.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] if no device accepts the whole range.
    pub fn load(&mut self, addr: u64, buf: &mut [u8]) -> Result<(), BusError> {
        for dev in self.devices_mut() {
            if let Some(offset) = dev.offset_of(addr) {
                if dev.load(offset, buf) {
                    return Ok(());
                }
            }
        }
        Err(BusError::Unmapped {
            addr,
            len: buf.len(),
        })
    }

    /// Writes `data` at physical address `addr`.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] if no device accepts the whole range; nothing is written.
    pub fn store(&mut self, addr: u64, data: &[u8]) -> Result<(), BusError> {
        for dev in self.devices_mut() {
            if let Some(offset) = dev.offset_of(addr) {
                if dev.store(offset, data) {
                    return Ok(());
                }
            }
        }
        Err(BusError::Unmapped {
            addr,
            len: data.len(),
        })
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] on an unmapped address.
    pub fn read_u8(&mut self, addr: u64) -> Result<u8, BusError> {
        let mut b = [0u8; 1];
        self.load(addr, &mut b)?;
        Ok(b[0])
    }

    /// Reads a little-endian half-word.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] on an unmapped range.
    pub fn read_u16(&mut self, addr: u64) -> Result<u16, BusError> {
        let mut b = [0u8; 2];
        self.load(addr, &mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    /// Reads a little-endian word.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] on an unmapped range.
    pub fn read_u32(&mut self, addr: u64) -> Result<u32, BusError> {
        let mut b = [0u8; 4];
        self.load(addr, &mut b)?;
        Ok(u32::from_le_bytes(b))
    }

    /// Reads a little-endian double-word.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] on an unmapped range.
    pub fn read_u64(&mut self, addr: u64) -> Result<u64, BusError> {
        let mut b = [0u8; 8];
        self.load(addr, &mut b)?;
        Ok(u64::from_le_bytes(b))
    }

    /// Writes a little-endian double-word.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] on an unmapped range.
    pub fn write_u64(&mut self, addr: u64, val: u64) -> Result<(), BusError> {
        self.store(addr, &val.to_le_bytes())
    }

    /// Reads the naturally aligned value at `addr`: a double-word on 8-byte
    /// alignment, a word on 4, a half-word on 2, otherwise a byte.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] on an unmapped range.
    pub fn read_aligned(&mut self, addr: u64) -> Result<u64, BusError> {
        match addr % 8 {
            0 => self.read_u64(addr),
            4 => self.read_u32(addr).map(u64::from),
            2 | 6 => self.read_u16(addr).map(u64::from),
            _ => self.read_u8(addr).map(u64::from),
        }
    }

    /// Reads bytes from `addr` up to (not including) the first NUL.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] if `addr` itself is unmapped, [`BusError::Unterminated`]
    /// if mapped memory ends before a NUL.
    pub fn read_cstr(&mut self, addr: u64) -> Result<String, BusError> {
        let mut bytes = Vec::new();
        let mut cursor = addr;
        loop {
            let byte = match self.read_u8(cursor) {
                Ok(b) => b,
                Err(e) if cursor == addr => return Err(e),
                Err(_) => return Err(BusError::Unterminated { addr }),
            };
            if byte == 0 {
                break;
            }
            bytes.push(byte);
            cursor = cursor
                .checked_add(1)
                .ok_or(BusError::Unterminated { addr })?;
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Copies a binary image to physical address `addr`.
    ///
    /// # Errors
    ///
    /// [`BusError::Unmapped`] if the image does not fit in one device.
    pub fn load_binary_at(&mut self, data: &[u8], addr: u64) -> Result<(), BusError> {
        self.store(addr, data)
    }

    /// Machine side: posts `value` for the host.
    ///
    /// # Errors
    ///
    /// [`HostChannelError::Overrun`] if the host has not consumed the previous value.
    pub fn set_tohost(&mut self, value: u64) -> Result<(), HostChannelError> {
        self.host.tohost.post(value)
    }

    /// Machine side: collects the host's reply. Consume-once.
    pub fn get_fromhost(&mut self) -> Option<u64> {
        self.host.fromhost.take()
    }

    /// Raises an IPI for `hart`; delivered before that hart's next batch.
    pub fn send_ipi(&mut self, hart: u32) {
        let _ = self.ipis.insert(hart);
    }

    /// Whether an IPI for `hart` is waiting for delivery.
    pub fn ipi_pending(&self, hart: u32) -> bool {
        self.ipis.contains(hart)
    }

    /// Removes and reports the pending IPI for `hart`.
    pub(crate) fn take_ipi(&mut self, hart: u32) -> bool {
        self.ipis.remove(hart)
    }

    /// Records an exit request; the run loop stops at the next batch boundary.
    pub fn request_exit(&self, code: u64) {
        info!(code, "exit requested");
        self.exit_request.request(code);
    }

    /// The requested exit code, if any.
    pub fn exit_code(&self) -> Option<u64> {
        self.exit_request.code()
    }
}
