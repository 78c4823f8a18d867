//! Data cache maintenance by virtual address, for buffers shared with DMA masters.

use aarch64_cpu::asm::barrier;
use bsp_mmc::DmaOps;

const CACHE_LINE: usize = 64;

fn for_each_line(addr: usize, len: usize, mut op: impl FnMut(usize)) {
    let start = addr & !(CACHE_LINE - 1);
    let end = (addr + len).next_multiple_of(CACHE_LINE);
    for line in (start..end).step_by(CACHE_LINE) {
        op(line);
    }
    barrier::dsb(barrier::SY);
}

/// Write dirty lines back to the point of coherency (DC CVAC).
pub fn clean_range(addr: usize, len: usize) {
    for_each_line(addr, len, |line| unsafe {
        // SAFETY: cache maintenance does not change memory contents.
        core::arch::asm!("dc cvac, {}", in(reg) line, options(nostack, preserves_flags));
    });
}

/// Clean and invalidate (DC CIVAC). Partial lines at either end keep the
/// CPU's writes to their neighbours.
pub fn invalidate_range(addr: usize, len: usize) {
    for_each_line(addr, len, |line| unsafe {
        // SAFETY: as above.
        core::arch::asm!("dc civac, {}", in(reg) line, options(nostack, preserves_flags));
    });
}

/// [`DmaOps`] for identity-mapped, cacheable memory.
#[derive(Debug, Default, Copy, Clone)]
pub struct CacheMaintenance;

impl DmaOps for CacheMaintenance {
    fn clean(&mut self, addr: usize, len: usize) {
        clean_range(addr, len);
    }

    fn invalidate(&mut self, addr: usize, len: usize) {
        invalidate_range(addr, len);
    }
}
