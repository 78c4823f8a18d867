//! RK3399 register windows used by the board-support package.
//!
//! All of them sit inside the 128 MiB peripheral window at `0xF800_0000`.

/// SD/MMC host controller (DesignWare)
pub const SDMMC_BASE: usize = 0xFE32_0000;

/// PMU general register file
pub const PMU_GRF_BASE: usize = 0xFF32_0000;

/// PWM controller
pub const PWM_BASE: usize = 0xFF42_0000;

/// Debug UART (UART2, 8250-compatible)
pub const UART2_BASE: usize = 0xFF1A_0000;

/// PMU clock and reset unit
pub const PMUCRU_BASE: usize = 0xFF75_0000;

/// Clock and reset unit
pub const CRU_BASE: usize = 0xFF76_0000;

/// General register file
pub const GRF_BASE: usize = 0xFF77_0000;
