//! Register access primitives shared by the RK3399 drivers.
//!
//! Drivers never touch raw pointers. They are generic over [`RegisterBlock`],
//! which the platform crate implements with volatile MMIO and the `mock`
//! feature implements with an in-memory register file.

#![no_std]

#[cfg(feature = "mock")]
extern crate alloc;

#[cfg(feature = "mock")]
pub mod mock;

/// Build a Rockchip write-masked value.
///
/// Most Rockchip CRU/GRF registers only latch the low 16 bits whose
/// corresponding write-enable bit in the high half is set.
#[inline]
pub const fn hiword_update(clear: u32, set: u32) -> u32 {
    ((clear | set) << 16) | set
}

/// A block of 32-bit registers addressed by byte offset.
pub trait RegisterBlock {
    fn read32(&self, offset: usize) -> u32;

    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write. Not atomic.
    #[inline]
    fn modify32<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }

    #[inline]
    fn set_bits32(&self, offset: usize, mask: u32) {
        self.modify32(offset, |v| v | mask);
    }

    #[inline]
    fn clear_bits32(&self, offset: usize, mask: u32) {
        self.modify32(offset, |v| v & !mask);
    }

    #[inline]
    fn is_set32(&self, offset: usize, mask: u32) -> bool {
        self.read32(offset) & mask != 0
    }

    /// Clear `clear` and set `set` in a write-masked register with a single write.
    #[inline]
    fn clrsetreg(&self, offset: usize, clear: u32, set: u32) {
        self.write32(offset, hiword_update(clear, set));
    }

    #[inline]
    fn setreg(&self, offset: usize, set: u32) {
        self.write32(offset, hiword_update(0, set));
    }

    #[inline]
    fn clrreg(&self, offset: usize, clear: u32) {
        self.write32(offset, clear << 16);
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &T {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Busy-wait delays.
pub trait Delay {
    fn delay_us(&mut self, us: u32);

    /// Sub-microsecond waits round up to one microsecond.
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1000).max(1));
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        (**self).delay_ns(ns)
    }
}
