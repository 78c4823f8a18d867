use bsp_clock::regs::{
    CARD_CLK_DIV_MASK, CARD_CLK_PLL_MASK, CARD_CLK_PLL_SEL_GPLL, CARD_CLK_PLL_SHIFT, clkgate,
    clksel, softrst,
};
use bsp_clock::{GPLL_HZ, Pll, read_pll_rate};
use bsp_regs::{Delay, RegisterBlock};
use log::{debug, error};

use crate::{BoardError, GpioBank, GpioFunction, GpioPort, Iomux};

pub const SDMMC_SOFTRST_CON: usize = 7;
pub const SDMMC_SRST: u32 = 1 << 10;
pub const SDMMC_RESET_PULSE_US: u32 = 5;

pub const SDMMC_CLKSEL_CON: usize = 16;
/// GPLL / (7 + 1) = 100 MHz.
pub const SDMMC_GPLL_DIV: u32 = 7;
pub const SDMMC_CLKGATE_CON: usize = 6;
pub const SDMMC_SRC_GATE: u32 = 1 << 1;

/// Card data, clock and command pins, in programming order.
pub const SDMMC_PINS: [(GpioBank, GpioPort, u8); 8] = [
    (GpioBank::Gpio4, GpioPort::B, 4),
    (GpioBank::Gpio4, GpioPort::B, 5),
    (GpioBank::Gpio4, GpioPort::B, 0),
    (GpioBank::Gpio4, GpioPort::B, 1),
    (GpioBank::Gpio4, GpioPort::B, 2),
    (GpioBank::Gpio4, GpioPort::B, 3),
    (GpioBank::Gpio0, GpioPort::A, 7),
    (GpioBank::Gpio0, GpioPort::B, 0),
];

/// Resets the SD/MMC controller, feeds it 100 MHz from GPLL and muxes its
/// pins.
///
/// The clock is only touched when GPLL runs at 800 MHz. Otherwise an error
/// is logged and the pins are still muxed.
pub fn prepare_mmc_controller<R, D>(
    cru: &R,
    grf: &R,
    pmugrf: &R,
    delay: &mut D,
) -> Result<(), BoardError>
where
    R: RegisterBlock + ?Sized,
    D: Delay + ?Sized,
{
    cru.setreg(softrst(SDMMC_SOFTRST_CON), SDMMC_SRST);
    delay.delay_us(SDMMC_RESET_PULSE_US);
    cru.clrreg(softrst(SDMMC_SOFTRST_CON), SDMMC_SRST);

    let gpll = read_pll_rate(cru, Pll::Gpll.con_base());
    if gpll == GPLL_HZ {
        cru.clrsetreg(
            clksel(SDMMC_CLKSEL_CON),
            CARD_CLK_PLL_MASK,
            CARD_CLK_PLL_SEL_GPLL << CARD_CLK_PLL_SHIFT,
        );
        cru.clrsetreg(clksel(SDMMC_CLKSEL_CON), CARD_CLK_DIV_MASK, SDMMC_GPLL_DIV);
        cru.clrreg(clkgate(SDMMC_CLKGATE_CON), SDMMC_SRC_GATE);
        debug!("sdmmc: clock source GPLL / {}", SDMMC_GPLL_DIV + 1);
    } else {
        error!("GPLL runs at {gpll} Hz, not {GPLL_HZ} Hz: sdmmc clock not set");
    }

    let iomux = Iomux::new(grf, pmugrf);
    for (bank, port, pin) in SDMMC_PINS {
        iomux.set_function(bank, port, pin, GpioFunction::Func1)?;
    }
    Ok(())
}
