//! Shared Main Memory.
//!
//! This module implements the flat memory region shared by every hart and by the
//! orchestrator's introspection commands. It provides:
//! 1. **Buffer:** Backing storage (`DramBuffer`) for the raw bytes.
//! 2. **Memory Region:** Device implementation that maps the buffer at a physical base address.

/// Main memory buffer (mmap or boxed slice) with bounds-checked accessors.
pub mod buffer;

use self::buffer::DramBuffer;
use crate::soc::traits::{Device, window};
use std::io;

/// Main memory mapped at a fixed physical base.
#[derive(Debug)]
pub struct MemoryRegion {
    /// Underlying storage.
    buffer: DramBuffer,
    /// The base physical address where this memory is mapped.
    base_addr: u64,
}

impl MemoryRegion {
    /// Allocates `size` zeroed bytes mapped at `base_addr`.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures from [`DramBuffer::new`].
    pub fn new(base_addr: u64, size: usize) -> io::Result<Self> {
        Ok(Self {
            buffer: DramBuffer::new(size)?,
            base_addr,
        })
    }

    /// Size of the region in bytes.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Copies a binary image into the region at a device-relative offset.
    ///
    /// Returns `false` and writes nothing if the image does not fit.
    pub fn load_image(&mut self, data: &[u8], offset: usize) -> bool {
        self.buffer.write_slice(offset, data)
    }

    /// Read-only view of the whole region.
    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }
}

impl Device for MemoryRegion {
    fn name(&self) -> &str {
        "DRAM"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, self.buffer.len() as u64)
    }

    fn load(&mut self, offset: u64, buf: &mut [u8]) -> bool {
        match window(offset, buf.len(), self.buffer.len()) {
            Some(range) => {
                buf.copy_from_slice(&self.buffer.as_slice()[range]);
                true
            }
            None => false,
        }
    }

    fn store(&mut self, offset: u64, data: &[u8]) -> bool {
        match window(offset, data.len(), self.buffer.len()) {
            Some(range) => {
                self.buffer.as_mut_slice()[range].copy_from_slice(data);
                true
            }
            None => false,
        }
    }
}
