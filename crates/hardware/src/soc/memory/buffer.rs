//! Main Memory Buffer Implementation.
//!
//! This module provides a bounds-checked wrapper around the raw allocation backing the
//! shared memory region. On Unix it allocates with anonymous `mmap` so large regions are
//! only committed by the OS as pages are touched; elsewhere it falls back to a boxed slice.
//! Every accessor validates `offset + len` against the buffer size; nothing outside the
//! allocation is ever dereferenced.

use std::io;
use std::slice;

/// Zero-initialised byte arena backing simulated main memory.
#[derive(Debug)]
pub struct DramBuffer {
    ptr: *mut u8,
    size: usize,
    is_mmap: bool,
}

// SAFETY: the buffer exclusively owns its allocation; shared access only hands out
// `&[u8]` and mutation requires `&mut self`.
unsafe impl Send for DramBuffer {}
// SAFETY: see above; no interior mutability.
unsafe impl Sync for DramBuffer {}

impl DramBuffer {
    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero size, or the OS error if `mmap` fails.
    pub fn new(size: usize) -> io::Result<Self> {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "memory region size must be non-zero",
            ));
        }

        #[cfg(unix)]
        {
            // SAFETY: anonymous private mapping with no address hint; the result is
            // checked against MAP_FAILED before use.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    size,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }
            Ok(Self {
                ptr: ptr as *mut u8,
                size,
                is_mmap: true,
            })
        }

        #[cfg(not(unix))]
        {
            let boxed = vec![0u8; size].into_boxed_slice();
            Ok(Self {
                ptr: Box::into_raw(boxed) as *mut u8,
                size,
                is_mmap: false,
            })
        }
    }

    /// Returns the size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Always `false`; zero-sized buffers are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Views the whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `size` initialised bytes for the lifetime of `self`.
        unsafe { slice::from_raw_parts(self.ptr, self.size) }
    }

    /// Views the whole buffer mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as `as_slice`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr, self.size) }
    }

    /// Returns `len` bytes starting at `offset`, or `None` if the range leaves the buffer.
    pub fn read_slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.as_slice().get(offset..end)
    }

    /// Copies `data` to `offset`; returns `false` without writing if it would not fit.
    pub fn write_slice(&mut self, offset: usize, data: &[u8]) -> bool {
        let Some(end) = offset.checked_add(data.len()) else {
            return false;
        };
        match self.as_mut_slice().get_mut(offset..end) {
            Some(dest) => {
                dest.copy_from_slice(data);
                true
            }
            None => false,
        }
    }
}

impl Drop for DramBuffer {
    /// Releases the allocation: `munmap` on Unix, the boxed slice elsewhere.
    fn drop(&mut self) {
        if self.is_mmap {
            #[cfg(unix)]
            // SAFETY: `ptr`/`size` describe exactly the mapping created in `new`.
            unsafe {
                let _ = libc::munmap(self.ptr as *mut libc::c_void, self.size);
            }
        } else {
            #[cfg(not(unix))]
            // SAFETY: `ptr` came from `Box::into_raw` of a `[u8]` of length `size`.
            unsafe {
                drop(Box::from_raw(slice::from_raw_parts_mut(self.ptr, self.size)));
            }
        }
    }
}
