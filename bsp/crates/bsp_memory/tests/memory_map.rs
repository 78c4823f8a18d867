//! DRAM decode, resource descriptors and the virtual memory map.

use bsp_memory::*;
use bsp_regs::mock::MockRegisters;

const GIB: u64 = 1 << 30;

#[test]
fn dual_channel_dual_rank_is_capped_below_registers() {
    // Both channels: 2 ranks, 10 columns, 8 banks, 15 rows, 32-bit bus.
    let grf = MockRegisters::new();
    grf.set(PMU_GRF_OS_REG2, 0x0AA0_1AA0);

    let info = DramInfo::decode(0x0AA0_1AA0);
    assert_eq!(info.channels().len(), 2);
    for ch in info.channels() {
        assert_eq!(
            (ch.rank, ch.col, ch.bank, ch.cs0_row, ch.cs1_row, ch.bw),
            (2, 10, 3, 15, 15, 2)
        );
        assert_eq!(ch.size_mb(), 2048);
    }
    assert_eq!(info.total_mb(), 4096);
    assert_eq!(dram_size(&grf), PERIPH_BASE);
}

#[test]
fn single_channel_with_three_quarter_rows() {
    let grf = MockRegisters::new();
    grf.set(PMU_GRF_OS_REG2, 0x4000_02C0);

    let info = DramInfo::decode(0x4000_02C0);
    assert_eq!(info.channel_count, 1);
    assert!(info.channels()[0].row_3_4);
    assert_eq!(info.total_mb(), 1536);
    assert_eq!(dram_size(&grf), 0x6000_0000);
}

#[test]
fn hobs_carve_atf_and_declare_extra_memory() {
    let mut hobs = HobList::<16>::new();
    let extra = build_memory_hobs(&mut hobs, &MemoryConfig::RK3399, PERIPH_BASE).unwrap();
    assert_eq!(extra, 0xB800_0000);

    let got: Vec<_> = hobs
        .iter()
        .map(|h| (h.resource_type, h.physical_start, h.length))
        .collect();
    assert_eq!(
        got,
        [
            (ResourceType::SystemMemory, 0, 0),
            (ResourceType::MemoryReserved, 0, 0x20_0000),
            (ResourceType::SystemMemory, 0x20_0000, GIB - 0x20_0000),
            (ResourceType::SystemMemory, EXTRA_SYSTEM_MEMORY_BASE, 0xB800_0000),
        ]
    );
    assert_eq!(hobs.as_slice()[1].attributes, ResourceAttributes::PRESENT);
    assert_eq!(hobs.as_slice()[2].attributes, ResourceAttributes::SYSTEM_MEMORY);
}

#[test]
fn hobs_without_extra_memory() {
    for size in [0, GIB / 2, GIB] {
        let mut hobs = HobList::<8>::new();
        assert_eq!(
            build_memory_hobs(&mut hobs, &MemoryConfig::RK3399, size),
            Ok(0)
        );
        assert_eq!(hobs.len(), 3, "memory size {size:#x}");
    }
}

#[test]
fn hobs_carve_several_regions_in_order() {
    static RESERVED: [ReservedRegion; 2] = [
        ReservedRegion {
            base: 0x10_0000,
            size: 0x10_0000,
        },
        ReservedRegion {
            base: 0x3000_0000,
            size: 0x1000,
        },
    ];
    let config = MemoryConfig {
        reserved: &RESERVED,
        ..MemoryConfig::RK3399
    };
    let mut hobs = HobList::<8>::new();
    build_memory_hobs(&mut hobs, &config, GIB).unwrap();

    let got: Vec<_> = hobs
        .iter()
        .map(|h| (h.resource_type, h.physical_start, h.length))
        .collect();
    assert_eq!(
        got,
        [
            (ResourceType::SystemMemory, 0, 0x10_0000),
            (ResourceType::MemoryReserved, 0x10_0000, 0x10_0000),
            (ResourceType::SystemMemory, 0x20_0000, 0x2FE0_0000),
            (ResourceType::MemoryReserved, 0x3000_0000, 0x1000),
            (ResourceType::SystemMemory, 0x3000_1000, 0x0FFF_F000),
        ]
    );
}

#[test]
fn hobs_report_a_full_list() {
    let mut hobs = HobList::<3>::new();
    assert_eq!(
        build_memory_hobs(&mut hobs, &MemoryConfig::RK3399, PERIPH_BASE),
        Err(MemoryError::HobListFull)
    );
}

#[test]
fn virtual_memory_map_for_4gib() {
    let map = VirtualMemoryMap::build(&MemoryConfig::RK3399, PERIPH_BASE).unwrap();
    assert_eq!(
        map.as_slice(),
        [
            MemoryRegionDescriptor::identity(PERIPH_BASE, PERIPH_SIZE, ArmMemoryAttributes::Device),
            MemoryRegionDescriptor::identity(0, GIB, ArmMemoryAttributes::WriteBack),
            MemoryRegionDescriptor::identity(
                EXTRA_SYSTEM_MEMORY_BASE,
                0xB800_0000,
                ArmMemoryAttributes::WriteBack
            ),
            MemoryRegionDescriptor::END,
        ]
    );
    assert_eq!(map.regions().len(), 3);
    assert!(map.as_slice().len() <= MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS);
}

#[test]
fn virtual_memory_map_for_1gib() {
    let map = VirtualMemoryMap::build(&MemoryConfig::RK3399, GIB).unwrap();
    assert_eq!(map.as_slice().len(), 3);
    assert_eq!(map.as_slice()[2], MemoryRegionDescriptor::END);
}

#[test]
fn device_memory_map_is_contiguous() {
    for pair in DEVICE_MEMORY_MAP.windows(2) {
        assert_eq!(pair[0].end(), pair[1].address, "{}", pair[1].name);
    }
    assert_eq!(DEVICE_MEMORY_MAP[0].address, 0);
    assert_eq!(DEVICE_MEMORY_MAP[6].end(), 1 << 32);

    let regs = find_device_region(0xFF76_0000).unwrap();
    assert_eq!(regs.hob_option, HobOption::AddDev);
    assert_eq!(regs.memory_type, EfiMemoryType::MemoryMappedIo);
    assert_eq!(
        find_device_region(0x0210_0000).map(|d| d.name),
        Some("UEFI FD")
    );
}
