//! Volatile access to a memory-mapped register window.

use core::ptr::NonNull;

use bsp_regs::RegisterBlock;
use volatile::VolatilePtr;

/// A register window at a fixed physical address, identity mapped.
#[derive(Debug, Copy, Clone)]
pub struct MmioRegion {
    base: NonNull<u32>,
}

impl MmioRegion {
    /// # Safety
    ///
    /// `base` must be the non-null, 4-byte aligned start of a device register
    /// window that stays mapped for the lifetime of the region, and every
    /// offset later passed to [`RegisterBlock`] methods must lie inside it.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            // SAFETY: guaranteed by the caller.
            base: unsafe { NonNull::new_unchecked(base as *mut u32) },
        }
    }

    pub fn base(&self) -> usize {
        self.base.as_ptr() as usize
    }

    fn register(&self, offset: usize) -> VolatilePtr<'_, u32> {
        debug_assert_eq!(offset % 4, 0);
        // SAFETY: the window is mapped and `offset` is inside it (see `new`).
        unsafe { VolatilePtr::new(self.base.byte_add(offset)) }
    }
}

impl RegisterBlock for MmioRegion {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        self.register(offset).read()
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        self.register(offset).write(value);
    }
}

// Registers are only ever accessed through `&self` with single volatile
// loads and stores; serialising read-modify-write sequences is up to the
// owner of the region.
unsafe impl Send for MmioRegion {}
unsafe impl Sync for MmioRegion {}
