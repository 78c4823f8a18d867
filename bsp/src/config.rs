//! Build-time board configuration.

use bsp_memory::{ATF_RESERVED, MemoryConfig, ReservedRegion};
use bsp_mmc::{DwEmmcConfig, TransferMode};
use log::LevelFilter;

/// Pages handed out to drivers for DMA, carved out of system memory.
pub const DMA_POOL: ReservedRegion = ReservedRegion {
    base: 0x0800_0000,
    size: 0x0040_0000,
};

/// Capacity of the resource descriptor list built at boot.
pub const MAX_HOBS: usize = 16;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoardConfig {
    pub memory: MemoryConfig,
    pub dma_pool: ReservedRegion,
    pub emmc: DwEmmcConfig,
    pub log_level: LevelFilter,
}

impl BoardConfig {
    pub const RK3399: Self = Self {
        memory: MemoryConfig {
            reserved: &[ATF_RESERVED, DMA_POOL],
            ..MemoryConfig::RK3399
        },
        dma_pool: DMA_POOL,
        emmc: DwEmmcConfig {
            base_clock_hz: bsp_mmc::DEFAULT_BASE_CLOCK_HZ,
            transfer_mode: TransferMode::DEFAULT,
        },
        log_level: if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    };
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::RK3399
    }
}
