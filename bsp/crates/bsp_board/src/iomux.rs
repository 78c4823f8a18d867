use bsp_regs::RegisterBlock;
use log::trace;

use crate::BoardError;

/// IOMUX of GPIO2A in the GRF. GPIO0 and GPIO1 live in the PMU GRF at 0.
pub const GRF_GPIO2A_IOMUX: usize = 0xe000;

const BANK_STRIDE: usize = 0x10;
const PORT_STRIDE: usize = 0x4;
const PINS_PER_PORT: u8 = 8;
const FUNCTION_MASK: u32 = 0x3;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GpioBank {
    Gpio0 = 0,
    Gpio1,
    Gpio2,
    Gpio3,
    Gpio4,
}

impl GpioBank {
    /// Banks in the always-on power domain are muxed by the PMU GRF.
    pub const fn in_pmu_grf(self) -> bool {
        matches!(self, Self::Gpio0 | Self::Gpio1)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GpioPort {
    A = 0,
    B,
    C,
    D,
}

impl GpioPort {
    pub const fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GpioFunction {
    Gpio = 0,
    Func1,
    Func2,
    Func3,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pin {
    pub bank: GpioBank,
    pub port: GpioPort,
    pub index: u8,
}

impl Pin {
    pub const fn new(bank: GpioBank, port: GpioPort, index: u8) -> Result<Self, BoardError> {
        if index >= PINS_PER_PORT {
            return Err(BoardError::InvalidPin {
                bank: bank as u8,
                port: port.letter(),
                pin: index,
            });
        }
        Ok(Self { bank, port, index })
    }

    /// Offset of the IOMUX register in the GRF or PMU GRF.
    pub const fn iomux_offset(&self) -> usize {
        let port = self.port as usize * PORT_STRIDE;
        if self.bank.in_pmu_grf() {
            self.bank as usize * BANK_STRIDE + port
        } else {
            GRF_GPIO2A_IOMUX + (self.bank as usize - 2) * BANK_STRIDE + port
        }
    }

    pub const fn iomux_shift(&self) -> u32 {
        self.index as u32 * 2
    }
}

/// Pin function selection through the GRF and PMU GRF.
pub struct Iomux<R> {
    grf: R,
    pmugrf: R,
}

impl<R: RegisterBlock> Iomux<R> {
    pub fn new(grf: R, pmugrf: R) -> Self {
        Self { grf, pmugrf }
    }

    fn block(&self, pin: &Pin) -> &R {
        if pin.bank.in_pmu_grf() {
            &self.pmugrf
        } else {
            &self.grf
        }
    }

    pub fn set_function(
        &self,
        bank: GpioBank,
        port: GpioPort,
        pin: u8,
        function: GpioFunction,
    ) -> Result<(), BoardError> {
        let pin = Pin::new(bank, port, pin)?;
        let shift = pin.iomux_shift();
        self.block(&pin).clrsetreg(
            pin.iomux_offset(),
            FUNCTION_MASK << shift,
            (function as u32) << shift,
        );
        trace!(
            "GPIO{}{}{} -> {:?}",
            bank as u8,
            port.letter(),
            pin.index,
            function
        );
        Ok(())
    }

    /// Currently selected function number.
    pub fn function(&self, bank: GpioBank, port: GpioPort, pin: u8) -> Result<u32, BoardError> {
        let pin = Pin::new(bank, port, pin)?;
        let value = self.block(&pin).read32(pin.iomux_offset());
        Ok((value >> pin.iomux_shift()) & FUNCTION_MASK)
    }
}
