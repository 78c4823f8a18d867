//! 8250-compatible UART with 32-bit register stride.
//!
//! Trusted firmware leaves the debug UART at its final baud rate, so only
//! the line format and FIFOs are touched here.

use core::fmt;
use core::hint::spin_loop;

use bsp_regs::RegisterBlock;

mod reg {
    /// Receive buffer / transmit holding register
    pub const RBR_THR: usize = 0x00;
    /// Interrupt enable
    pub const IER: usize = 0x04;
    /// FIFO control (write only)
    pub const FCR: usize = 0x08;
    /// Line control
    pub const LCR: usize = 0x0c;
    /// Line status
    pub const LSR: usize = 0x14;
}

mod lsr {
    /// Receive data ready
    pub const DR: u32 = 1 << 0;
    /// Transmit holding register empty
    pub const THRE: u32 = 1 << 5;
}

/// 8 data bits, no parity, 1 stop bit.
const LCR_8N1: u32 = 0b11;
/// Enable and clear both FIFOs.
const FCR_ENABLE_AND_CLEAR: u32 = 0b111;

pub struct Ns16550<R> {
    regs: R,
}

impl<R: RegisterBlock> Ns16550<R> {
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    pub fn init(&mut self) {
        self.regs.write32(reg::IER, 0);
        self.regs.write32(reg::LCR, LCR_8N1);
        self.regs.write32(reg::FCR, FCR_ENABLE_AND_CLEAR);
    }

    /// Send a single byte (blocking)
    pub fn putc(&self, c: u8) {
        while !self.regs.is_set32(reg::LSR, lsr::THRE) {
            spin_loop();
        }
        self.regs.write32(reg::RBR_THR, u32::from(c));
    }

    /// Returns `Some(byte)` if data is available, `None` otherwise.
    pub fn try_getc(&self) -> Option<u8> {
        self.regs
            .is_set32(reg::LSR, lsr::DR)
            .then(|| (self.regs.read32(reg::RBR_THR) & 0xff) as u8)
    }
}

impl<R: RegisterBlock> fmt::Write for Ns16550<R> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.putc(b'\r');
            }
            self.putc(byte);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::fmt::Write;

    use bsp_regs::mock::MockRegisters;

    use super::*;

    #[test]
    fn init_sets_line_format_and_fifos() {
        let regs = MockRegisters::new();
        let mut uart = Ns16550::new(&regs);
        uart.init();
        assert_eq!(regs.writes(), [(0x04, 0), (0x0c, 0b11), (0x08, 0b111)]);
    }

    #[test]
    fn newline_is_sent_as_crlf() {
        let regs = MockRegisters::new();
        regs.set(reg::LSR, lsr::THRE);
        let mut uart = Ns16550::new(&regs);
        writeln!(uart, "ok").unwrap();
        assert_eq!(regs.writes_to(reg::RBR_THR), [0x6f, 0x6b, 0x0d, 0x0a]);
    }

    #[test]
    fn receive_only_when_data_ready() {
        let regs = MockRegisters::new();
        regs.set(reg::RBR_THR, 0x141);
        let uart = Ns16550::new(&regs);
        assert_eq!(uart.try_getc(), None);
        regs.set(reg::LSR, lsr::DR);
        assert_eq!(uart.try_getc(), Some(b'A'));
    }
}
