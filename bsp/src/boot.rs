//! Ordered platform bring-up, independent of how registers are reached.

use bsp_board::{prepare_mmc_controller, pwm_workaround};
use bsp_clock::Cru;
use bsp_memory::{HobList, VirtualMemoryMap, build_memory_hobs, dram_size};
use bsp_regs::{Delay, RegisterBlock};
use log::info;

use crate::BspError;
use crate::config::{BoardConfig, MAX_HOBS};

/// Register blocks touched during bring-up.
pub struct SocRegisters<R> {
    pub cru: R,
    pub pmucru: R,
    pub grf: R,
    pub pmugrf: R,
    pub pwm: R,
}

/// What bring-up learned about the board, for the later firmware stages.
#[derive(Debug, Clone)]
pub struct BootInfo {
    /// Usable DRAM in bytes.
    pub memory_size: u64,
    /// DRAM beyond the configured system memory.
    pub additional_memory: u64,
    pub hobs: HobList<MAX_HOBS>,
    pub memory_map: VirtualMemoryMap,
}

/// Clocks first, then board quirks, then the memory map.
pub fn bring_up<R, D>(
    soc: &SocRegisters<R>,
    delay: &mut D,
    config: &BoardConfig,
) -> Result<BootInfo, BspError>
where
    R: RegisterBlock,
    D: Delay + ?Sized,
{
    let mut cru = Cru::new(&soc.cru, &soc.pmucru, &mut *delay);
    cru.pmu_clock_init()?;
    cru.clock_init()?;
    drop(cru);

    pwm_workaround(&soc.pwm);
    prepare_mmc_controller(&soc.cru, &soc.grf, &soc.pmugrf, delay)?;

    let memory_size = dram_size(&soc.pmugrf);
    let mut hobs = HobList::new();
    let additional_memory = build_memory_hobs(&mut hobs, &config.memory, memory_size)?;
    let memory_map = VirtualMemoryMap::build(&config.memory, memory_size)?;
    info!(
        "bring-up done: {} resource descriptors, {} mapped regions",
        hobs.len(),
        memory_map.regions().len()
    );

    Ok(BootInfo {
        memory_size,
        additional_memory,
        hobs,
        memory_map,
    })
}
