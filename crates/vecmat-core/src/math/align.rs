//! Aligned storage for kernel buffers.
//!
//! Every vector and matrix keeps its elements in an [`AlignedBuffer`] whose
//! start address is a multiple of [`ALIGNMENT`] and whose byte size is
//! [`aligned_size`] of its length.
use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::slice;

use crate::config::ALIGNMENT;
use crate::error::{Error, Result};

const _: () = assert!(ALIGNMENT.is_power_of_two() && ALIGNMENT >= align_of::<f64>());

/// Smallest multiple of [`ALIGNMENT`] holding `n` f64 values.
///
/// Callers must bound `n` first; the allocators do so through the
/// max-elements checks.
#[inline]
pub fn aligned_size(n: usize) -> usize {
    let bytes = n * size_of::<f64>();
    (bytes + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Overflow-checked form of [`aligned_size`].
#[inline]
pub fn checked_aligned_size(n: usize) -> Option<usize> {
    let bytes = n.checked_mul(size_of::<f64>())?;
    Some(bytes.checked_add(ALIGNMENT - 1)? & !(ALIGNMENT - 1))
}

/// Owned, zero-initialised, [`ALIGNMENT`]-aligned buffer of f64.
pub(crate) struct AlignedBuffer {
    ptr: NonNull<f64>,
    len: usize,
    layout: Layout,
}

// The buffer is uniquely owned plain data, like `Vec<f64>`.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    fn layout_for(len: usize) -> Result<Layout> {
        let size = checked_aligned_size(len).ok_or(Error::Range)?;
        Layout::from_size_align(size, ALIGNMENT).map_err(|_| Error::Range)
    }

    /// Allocate `len` zeroed elements. `len` must be non-zero.
    pub(crate) fn zeroed(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::Range);
        }
        let layout = Self::layout_for(len)?;
        // SAFETY: `layout` has a non-zero size because `len > 0`.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw.cast::<f64>()).ok_or(Error::Alloc)?;
        Ok(Self { ptr, len, layout })
    }

    pub(crate) fn from_slice(src: &[f64]) -> Result<Self> {
        let mut buf = Self::zeroed(src.len())?;
        buf.as_mut_slice().copy_from_slice(src);
        Ok(buf)
    }

    pub(crate) fn try_clone(&self) -> Result<Self> {
        Self::from_slice(self.as_slice())
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const f64 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[f64] {
        // SAFETY: `ptr` points to `len` initialised f64 owned by `self`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with `self.layout`.
        unsafe { dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout) }
    }
}

impl Clone for AlignedBuffer {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(buf) => buf,
            Err(_) => handle_alloc_error(self.layout),
        }
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
