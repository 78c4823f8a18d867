//! DRAM sizing and the memory map handed to the MMU setup stage.

#![no_std]

mod device_map;
mod dram;
mod hob;
mod page;
mod vmm;

pub use device_map::*;
pub use dram::*;
pub use hob::*;
pub use page::*;
use thiserror::Error;
pub use vmm::*;

/// SoC register window. DRAM above this address is not reachable.
pub const PERIPH_BASE: u64 = 0xF800_0000;
pub const PERIPH_SIZE: u64 = 0x0800_0000;

/// Where DRAM beyond the configured system memory is declared.
pub const EXTRA_SYSTEM_MEMORY_BASE: u64 = 0x4000_0000;

/// Offset of `OS_REG2` in the PMU GRF, where the DRAM controller setup is recorded.
pub const PMU_GRF_OS_REG2: usize = 0x308;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum MemoryError {
    #[error("resource descriptor list is full")]
    HobListFull,
    #[error("virtual memory map is full")]
    VirtualMemoryMapFull,
    #[error("cannot allocate zero pages")]
    ZeroPages,
    #[error("out of pages: requested {requested}, {available} available")]
    OutOfPages { requested: usize, available: usize },
}

/// Static layout of system memory, known at build time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryConfig {
    pub system_memory_base: u64,
    pub system_memory_size: u64,
    /// Regions carved out of system memory, in ascending order.
    pub reserved: &'static [ReservedRegion],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReservedRegion {
    pub base: u64,
    pub size: u64,
}

impl ReservedRegion {
    pub const fn end(&self) -> u64 {
        self.base + self.size
    }
}

/// Trusted firmware image at the bottom of DRAM.
pub const ATF_RESERVED: ReservedRegion = ReservedRegion {
    base: 0,
    size: 0x20_0000,
};

impl MemoryConfig {
    /// The first gigabyte is always populated.
    pub const RK3399: Self = Self {
        system_memory_base: 0,
        system_memory_size: 0x4000_0000,
        reserved: &[ATF_RESERVED],
    };

    /// DRAM above the configured system memory; never negative.
    pub const fn additional_memory_size(&self, memory_size: u64) -> u64 {
        memory_size.saturating_sub(self.system_memory_size)
    }
}
