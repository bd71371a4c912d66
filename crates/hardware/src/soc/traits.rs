//! Device trait for memory-mapped I/O.
//!
//! This module defines the `Device` trait implemented by everything the [`System`](super::System)
//! routes physical accesses to. It provides:
//! 1. **Identification:** `name` and `address_range` for routing.
//! 2. **Access:** Byte-slice `load`/`store` at device-relative offsets, any length and alignment.
//! 3. **Ownership signalling:** A `false` return means "this device does not own the access";
//!    the caller falls through to the next device instead of treating it as fatal.
//!
//! All implementors must be `Send` so a `System` can move between threads with its simulator.

/// Trait for memory-mapped devices attached to the system.
pub trait Device: Send {
    /// Returns a short name for this device (e.g., `"DRAM"`, `"DEBUG"`).
    fn name(&self) -> &str;

    /// Returns `(base_address, size_in_bytes)` of the device window.
    fn address_range(&self) -> (u64, u64);

    /// Copies `buf.len()` bytes starting at `offset` into `buf`.
    ///
    /// Returns `false`, leaving `buf` untouched, if `[offset, offset + len)` is not
    /// entirely inside the window.
    fn load(&mut self, offset: u64, buf: &mut [u8]) -> bool;

    /// Copies `data` into the device starting at `offset`.
    ///
    /// Returns `false`, leaving the device untouched, if the range is not entirely
    /// inside the window. A rejected store never writes a prefix.
    fn store(&mut self, offset: u64, data: &[u8]) -> bool;

    /// Translates an absolute address into a device-relative offset, if the
    /// address falls inside the window.
    fn offset_of(&self, addr: u64) -> Option<u64> {
        let (base, size) = self.address_range();
        let offset = addr.checked_sub(base)?;
        (offset < size).then_some(offset)
    }
}

/// Returns the byte range `[offset, offset + len)` if it lies within `size` bytes.
///
/// Shared bounds check for device implementations; guards against `offset + len`
/// overflowing.
pub fn window(offset: u64, len: usize, size: usize) -> Option<std::ops::Range<usize>> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(len)?;
    (end <= size).then_some(start..end)
}
