use crate::{ArmMemoryAttributes, ResourceAttributes, ResourceType};

/// How a region is reported to the DXE core.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HobOption {
    NoHob,
    AddMem,
    AddDev,
    MaxMem,
}

/// UEFI memory types used by the device memory map.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EfiMemoryType {
    Reserved = 0,
    LoaderCode = 1,
    LoaderData = 2,
    BootServicesCode = 3,
    BootServicesData = 4,
    RuntimeServicesCode = 5,
    RuntimeServicesData = 6,
    Conventional = 7,
    Unusable = 8,
    AcpiReclaim = 9,
    AcpiNvs = 10,
    MemoryMappedIo = 11,
    MemoryMappedIoPortSpace = 12,
    PalCode = 13,
    Persistent = 14,
    MaxMemoryType = 15,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DeviceMemoryDescriptor {
    pub name: &'static str,
    pub address: u64,
    pub length: u64,
    pub resource_type: ResourceType,
    pub resource_attributes: ResourceAttributes,
    pub arm_attributes: ArmMemoryAttributes,
    pub hob_option: HobOption,
    pub memory_type: EfiMemoryType,
}

impl DeviceMemoryDescriptor {
    pub const fn end(&self) -> u64 {
        self.address + self.length
    }
}

const SYSTEM_MEMORY_CAPABILITIES: ResourceAttributes = ResourceAttributes::PRESENT
    .union(ResourceAttributes::INITIALIZED)
    .union(ResourceAttributes::TESTED)
    .union(ResourceAttributes::UNCACHEABLE)
    .union(ResourceAttributes::WRITE_COMBINEABLE)
    .union(ResourceAttributes::WRITE_THROUGH_CACHEABLE)
    .union(ResourceAttributes::WRITE_BACK_CACHEABLE)
    .union(ResourceAttributes::EXECUTION_PROTECTABLE);

/// Physical layout of a 4 GiB board, in ascending address order.
pub static DEVICE_MEMORY_MAP: [DeviceMemoryDescriptor; 7] = [
    DeviceMemoryDescriptor {
        name: "ATF",
        address: 0x0000_0000,
        length: 0x0020_0000,
        resource_type: ResourceType::MemoryReserved,
        resource_attributes: ResourceAttributes::PRESENT,
        arm_attributes: ArmMemoryAttributes::UncachedUnbuffered,
        hob_option: HobOption::AddMem,
        memory_type: EfiMemoryType::Reserved,
    },
    DeviceMemoryDescriptor {
        name: "HLOS memory 1",
        address: 0x0020_0000,
        length: 0x01E8_0000,
        resource_type: ResourceType::SystemMemory,
        resource_attributes: SYSTEM_MEMORY_CAPABILITIES,
        arm_attributes: ArmMemoryAttributes::WriteBack,
        hob_option: HobOption::AddMem,
        memory_type: EfiMemoryType::Conventional,
    },
    DeviceMemoryDescriptor {
        name: "UEFI FD",
        address: 0x0208_0000,
        length: 0x0020_0000,
        resource_type: ResourceType::SystemMemory,
        resource_attributes: SYSTEM_MEMORY_CAPABILITIES,
        arm_attributes: ArmMemoryAttributes::WriteBack,
        hob_option: HobOption::AddMem,
        memory_type: EfiMemoryType::BootServicesCode,
    },
    DeviceMemoryDescriptor {
        name: "HLOS memory 2",
        address: 0x0228_0000,
        length: 0xF3C8_0000,
        resource_type: ResourceType::SystemMemory,
        resource_attributes: SYSTEM_MEMORY_CAPABILITIES,
        arm_attributes: ArmMemoryAttributes::WriteBack,
        hob_option: HobOption::AddMem,
        memory_type: EfiMemoryType::Conventional,
    },
    DeviceMemoryDescriptor {
        name: "Display Reserved",
        address: 0xF5F0_0000,
        length: 0x007E_9000,
        resource_type: ResourceType::MemoryReserved,
        resource_attributes: ResourceAttributes::WRITE_THROUGH_CACHEABLE,
        arm_attributes: ArmMemoryAttributes::WriteThrough,
        hob_option: HobOption::AddMem,
        memory_type: EfiMemoryType::MaxMemoryType,
    },
    DeviceMemoryDescriptor {
        name: "HLOS memory 3",
        address: 0xF66E_9000,
        length: 0x0191_7000,
        resource_type: ResourceType::SystemMemory,
        resource_attributes: SYSTEM_MEMORY_CAPABILITIES,
        arm_attributes: ArmMemoryAttributes::WriteBack,
        hob_option: HobOption::AddMem,
        memory_type: EfiMemoryType::Conventional,
    },
    DeviceMemoryDescriptor {
        name: "Registers regions",
        address: 0xF800_0000,
        length: 0x0800_0000,
        resource_type: ResourceType::MemoryMappedIo,
        resource_attributes: ResourceAttributes::UNCACHEABLE,
        arm_attributes: ArmMemoryAttributes::Device,
        hob_option: HobOption::AddDev,
        memory_type: EfiMemoryType::MemoryMappedIo,
    },
];

/// The device memory map entry containing `address`.
pub fn find_device_region(address: u64) -> Option<&'static DeviceMemoryDescriptor> {
    DEVICE_MEMORY_MAP
        .iter()
        .find(|d| (d.address..d.end()).contains(&address))
}
