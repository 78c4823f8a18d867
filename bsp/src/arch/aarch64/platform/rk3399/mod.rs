//! Rockchip RK3399 platform support
//!
//! Wires the drivers to the SoC register windows, runs the bring-up
//! sequence and publishes the eMMC host protocol.
//!
//! Key addresses:
//! - CRU: 0xFF76_0000, PMU CRU: 0xFF75_0000
//! - GRF: 0xFF77_0000, PMU GRF: 0xFF32_0000
//! - SD/MMC: 0xFE32_0000
//! - UART2: 0xFF1A_0000

pub mod emmc;
pub mod memory_map;
pub mod mmio;

use bsp_memory::PageAllocator;
use bsp_mmc::EfiMmcHostProtocol;
use conquer_once::spin::Lazy;
use log::{debug, error, info};
use memory_map::*;
use mmio::MmioRegion;
use spin::Mutex;

use crate::BspError;
use crate::arch::aarch64::timer::GenericTimer;
use crate::boot::{BootInfo, SocRegisters, bring_up};
use crate::config::BoardConfig;
use crate::uart::Ns16550;

/// Global UART instance for debug output
pub static UART: Lazy<Mutex<Ns16550<MmioRegion>>> = Lazy::new(|| {
    // SAFETY: UART2_BASE is the debug UART window.
    let mut uart = Ns16550::new(unsafe { MmioRegion::new(UART2_BASE) });
    uart.init();
    Mutex::new(uart)
});

/// Register windows of the blocks the bring-up sequence programs.
pub fn soc_registers() -> SocRegisters<MmioRegion> {
    // SAFETY: fixed RK3399 register windows, identity mapped before the MMU
    // is on and by the device map after.
    unsafe {
        SocRegisters {
            cru: MmioRegion::new(CRU_BASE),
            pmucru: MmioRegion::new(PMUCRU_BASE),
            grf: MmioRegion::new(GRF_BASE),
            pmugrf: MmioRegion::new(PMU_GRF_BASE),
            pwm: MmioRegion::new(PWM_BASE),
        }
    }
}

pub struct Platform {
    pub boot: BootInfo,
    pub mmc_host: &'static EfiMmcHostProtocol,
}

/// Initialize the RK3399 platform
///
/// Installs the serial logger, brings up clocks, quirks and the memory
/// map, then publishes the eMMC host protocol. Call once, early in boot.
pub fn init(config: &BoardConfig) -> Result<Platform, BspError> {
    if crate::logger::init().is_err() {
        debug!("logger already installed, keeping it");
    }
    info!("RK3399 board-support package");

    let mut timer = GenericTimer::new();
    let boot = bring_up(&soc_registers(), &mut timer, config).inspect_err(|e| {
        error!("bring-up failed: {e}");
    })?;

    let pool = config.dma_pool;
    let mut pages = PageAllocator::new(pool.base as usize, pool.size as usize);
    let mmc_host = emmc::publish(&mut pages, config.emmc)?;
    info!("MMC host protocol published");

    Ok(Platform { boot, mmc_host })
}
