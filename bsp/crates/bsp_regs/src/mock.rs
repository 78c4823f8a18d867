//! In-memory register model for host tests.
//!
//! The model is deliberately small: a sparse register file plus a handful of
//! behaviours that real peripherals exhibit and that polling loops depend on
//! (self-clearing start/reset bits, write-one-to-clear status registers,
//! status bits raised by a write, FIFO-like queued reads).

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{Delay, RegisterBlock};

#[derive(Debug, Clone, Copy)]
struct Trigger {
    on: usize,
    target: usize,
    bits: u32,
}

#[derive(Debug, Default)]
struct State {
    values: BTreeMap<usize, u32>,
    queued: BTreeMap<usize, VecDeque<u32>>,
    self_clearing: BTreeMap<usize, u32>,
    write_one_to_clear: BTreeSet<usize>,
    triggers: Vec<Trigger>,
    writes: Vec<(usize, u32)>,
}

#[derive(Debug, Default)]
pub struct MockRegisters {
    hiword_masked: bool,
    state: RefCell<State>,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers that latch only the write-enabled low half, like the
    /// Rockchip CRU and GRF.
    pub fn hiword_masked() -> Self {
        Self {
            hiword_masked: true,
            ..Self::default()
        }
    }

    /// Preload a register without logging a write.
    pub fn set(&self, offset: usize, value: u32) -> &Self {
        self.state.borrow_mut().values.insert(offset, value);
        self
    }

    pub fn get(&self, offset: usize) -> u32 {
        self.state
            .borrow()
            .values
            .get(&offset)
            .copied()
            .unwrap_or(0)
    }

    /// Values returned by subsequent reads before falling back to the stored value.
    pub fn queue_reads<I>(&self, offset: usize, values: I) -> &Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.state
            .borrow_mut()
            .queued
            .entry(offset)
            .or_default()
            .extend(values);
        self
    }

    /// Bits in `mask` drop back to zero as soon as they are written.
    pub fn self_clearing(&self, offset: usize, mask: u32) -> &Self {
        *self
            .state
            .borrow_mut()
            .self_clearing
            .entry(offset)
            .or_default() |= mask;
        self
    }

    pub fn write_one_to_clear(&self, offset: usize) -> &Self {
        self.state.borrow_mut().write_one_to_clear.insert(offset);
        self
    }

    /// Every write to `on` ORs `bits` into `target`.
    pub fn on_write(&self, on: usize, target: usize, bits: u32) -> &Self {
        self.state
            .borrow_mut()
            .triggers
            .push(Trigger { on, target, bits });
        self
    }

    /// Raw values in write order, before any masking.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.borrow().writes.clone()
    }

    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().writes.clear();
    }
}

impl RegisterBlock for MockRegisters {
    fn read32(&self, offset: usize) -> u32 {
        let mut state = self.state.borrow_mut();
        if let Some(value) = state.queued.get_mut(&offset).and_then(VecDeque::pop_front) {
            return value;
        }
        state.values.get(&offset).copied().unwrap_or(0)
    }

    fn write32(&self, offset: usize, value: u32) {
        let mut state = self.state.borrow_mut();
        state.writes.push((offset, value));

        let old = state.values.get(&offset).copied().unwrap_or(0);
        let mut stored = if state.write_one_to_clear.contains(&offset) {
            old & !value
        } else if self.hiword_masked {
            let mask = value >> 16;
            (old & !mask) | (value & mask)
        } else {
            value
        };
        if let Some(mask) = state.self_clearing.get(&offset) {
            stored &= !mask;
        }
        state.values.insert(offset, stored);

        let fired: Vec<Trigger> = state
            .triggers
            .iter()
            .filter(|t| t.on == offset)
            .copied()
            .collect();
        for t in fired {
            *state.values.entry(t.target).or_default() |= t.bits;
        }
    }
}

/// Records requested delays instead of waiting.
#[derive(Debug, Default, Clone)]
pub struct MockDelay {
    pub total_us: u64,
    pub calls: usize,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.total_us += u64::from(us);
        self.calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hiword_masked_registers_keep_unmasked_bits() {
        let regs = MockRegisters::hiword_masked();
        regs.set(0x10, 0x00f0);
        regs.clrsetreg(0x10, 0x000f, 0x0005);
        assert_eq!(regs.read32(0x10), 0x00f5);
        regs.clrreg(0x10, 0x00f0);
        assert_eq!(regs.read32(0x10), 0x0005);
    }

    #[test]
    fn write_one_to_clear_and_triggers() {
        let regs = MockRegisters::new();
        regs.write_one_to_clear(0x44).set(0x44, 0b1110);
        regs.on_write(0x2c, 0x44, 0b0100).self_clearing(0x2c, 1 << 31);

        regs.write32(0x44, 0b0110);
        assert_eq!(regs.read32(0x44), 0b1000);

        regs.write32(0x2c, (1 << 31) | 5);
        assert_eq!(regs.read32(0x2c), 5);
        assert_eq!(regs.read32(0x44), 0b1100);
        assert_eq!(regs.writes_to(0x2c), [(1 << 31) | 5]);
    }

    #[test]
    fn queued_reads_drain_before_stored_value() {
        let regs = MockRegisters::new();
        regs.set(0x200, 9).queue_reads(0x200, [1, 2]);
        assert_eq!(regs.read32(0x200), 1);
        assert_eq!(regs.read32(0x200), 2);
        assert_eq!(regs.read32(0x200), 9);
    }
}
