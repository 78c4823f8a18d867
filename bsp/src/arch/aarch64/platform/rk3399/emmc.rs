//! The SD/MMC controller behind the published MMC host protocol.

use bsp_memory::{PAGE_SIZE, PageAllocator};
use bsp_mmc::{
    DwEmmc, DwEmmcConfig, EfiMmcHostProtocol, HostInstance, IdmacDescriptor, MAX_DESC_PAGES,
    TransferMode,
};
use conquer_once::spin::OnceCell;
use log::info;
use spin::Mutex;

use super::memory_map::SDMMC_BASE;
use super::mmio::MmioRegion;
use crate::BspError;
use crate::arch::aarch64::cache::CacheMaintenance;
use crate::arch::aarch64::timer::GenericTimer;

pub type EmmcHost = DwEmmc<MmioRegion, GenericTimer, CacheMaintenance>;

static HOST: OnceCell<Mutex<EmmcHost>> = OnceCell::uninit();

/// The board's single MMC host.
pub struct Emmc;

impl HostInstance for Emmc {
    type Host = EmmcHost;

    fn host() -> Option<&'static Mutex<EmmcHost>> {
        HOST.get()
    }
}

pub static MMC_HOST_PROTOCOL: EfiMmcHostProtocol = EfiMmcHostProtocol::new::<Emmc>();

fn allocate_descriptors(
    pages: &mut PageAllocator,
) -> Result<&'static mut [IdmacDescriptor], BspError> {
    let addr = pages.allocate_pages(MAX_DESC_PAGES)?;
    let count = MAX_DESC_PAGES * PAGE_SIZE / size_of::<IdmacDescriptor>();
    let table = addr as *mut IdmacDescriptor;
    // SAFETY: the allocator hands out each page once, from identity-mapped
    // DRAM reserved for DMA, so the table is exclusively ours forever.
    unsafe {
        table.write_bytes(0, count);
        Ok(core::slice::from_raw_parts_mut(table, count))
    }
}

/// Creates the controller driver and makes it reachable through
/// [`MMC_HOST_PROTOCOL`].
pub fn publish(
    pages: &mut PageAllocator,
    config: DwEmmcConfig,
) -> Result<&'static EfiMmcHostProtocol, BspError> {
    if HOST.is_initialized() {
        return Err(BspError::AlreadyInitialized);
    }
    let descriptors: &'static mut [IdmacDescriptor] = match config.transfer_mode {
        TransferMode::Idmac => allocate_descriptors(pages)?,
        TransferMode::Fifo => &mut [],
    };
    info!(
        "emmc: {:?} transfers, {} descriptors, source clock {} Hz",
        config.transfer_mode,
        descriptors.len(),
        config.base_clock_hz
    );

    // SAFETY: SDMMC_BASE is the controller window and nothing else maps it.
    let regs = unsafe { MmioRegion::new(SDMMC_BASE) };
    let host = DwEmmc::new(
        regs,
        GenericTimer::new(),
        CacheMaintenance,
        config,
        descriptors,
    );
    HOST.try_init_once(|| Mutex::new(host))
        .map_err(|_| BspError::AlreadyInitialized)?;
    Ok(&MMC_HOST_PROTOCOL)
}
