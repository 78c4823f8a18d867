use core::hint::spin_loop;

use aarch64_cpu::asm::barrier;
use aarch64_cpu::registers::*;
use bsp_regs::Delay;

/// Busy-wait delays on the ARM generic timer.
#[derive(Debug, Copy, Clone)]
pub struct GenericTimer {
    ticks_per_us: u64,
}

impl GenericTimer {
    pub fn new() -> Self {
        Self {
            ticks_per_us: (CNTFRQ_EL0.get() / 1_000_000).max(1),
        }
    }

    fn now() -> u64 {
        barrier::isb(barrier::SY);
        CNTPCT_EL0.get()
    }
}

impl Default for GenericTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Delay for GenericTimer {
    fn delay_us(&mut self, us: u32) {
        let ticks = u64::from(us) * self.ticks_per_us;
        let start = Self::now();
        while Self::now().wrapping_sub(start) < ticks {
            spin_loop();
        }
    }
}
