use log::debug;

use crate::{EXTRA_SYSTEM_MEMORY_BASE, MemoryConfig, MemoryError, PERIPH_BASE, PERIPH_SIZE};

/// Descriptor count of the virtual memory map, terminator included.
pub const MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS: usize = 12;

/// Memory attributes understood by the MMU setup stage.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArmMemoryAttributes {
    UncachedUnbuffered = 0,
    NonSecureUncachedUnbuffered = 1,
    WriteBack = 2,
    NonSecureWriteBack = 3,
    WriteBackNonShareable = 4,
    NonSecureWriteBackNonShareable = 5,
    WriteThrough = 6,
    NonSecureWriteThrough = 7,
    Device = 8,
    NonSecureDevice = 9,
}

pub const DDR_ATTRIBUTES_CACHED: ArmMemoryAttributes = ArmMemoryAttributes::WriteBack;

#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryRegionDescriptor {
    pub physical_base: u64,
    pub virtual_base: u64,
    pub length: u64,
    pub attributes: ArmMemoryAttributes,
}

impl MemoryRegionDescriptor {
    pub const END: Self = Self {
        physical_base: 0,
        virtual_base: 0,
        length: 0,
        attributes: ArmMemoryAttributes::UncachedUnbuffered,
    };

    pub const fn identity(base: u64, length: u64, attributes: ArmMemoryAttributes) -> Self {
        Self {
            physical_base: base,
            virtual_base: base,
            length,
            attributes,
        }
    }
}

/// Identity-mapped regions, closed by a zero descriptor.
#[derive(Debug, Clone)]
pub struct VirtualMemoryMap {
    table: [MemoryRegionDescriptor; MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS],
    len: usize,
}

impl VirtualMemoryMap {
    /// Peripheral window, configured DRAM, then any DRAM beyond it.
    pub fn build(config: &MemoryConfig, memory_size: u64) -> Result<Self, MemoryError> {
        let mut map = Self {
            table: [MemoryRegionDescriptor::END; MAX_VIRTUAL_MEMORY_MAP_DESCRIPTORS],
            len: 0,
        };
        map.push(MemoryRegionDescriptor::identity(
            PERIPH_BASE,
            PERIPH_SIZE,
            ArmMemoryAttributes::Device,
        ))?;
        map.push(MemoryRegionDescriptor::identity(
            config.system_memory_base,
            config.system_memory_size,
            DDR_ATTRIBUTES_CACHED,
        ))?;
        let additional = config.additional_memory_size(memory_size);
        if additional > 0 {
            map.push(MemoryRegionDescriptor::identity(
                EXTRA_SYSTEM_MEMORY_BASE,
                additional,
                DDR_ATTRIBUTES_CACHED,
            ))?;
        }
        map.push(MemoryRegionDescriptor::END)?;
        debug!("virtual memory map: {} descriptors", map.len);
        Ok(map)
    }

    fn push(&mut self, desc: MemoryRegionDescriptor) -> Result<(), MemoryError> {
        let slot = self
            .table
            .get_mut(self.len)
            .ok_or(MemoryError::VirtualMemoryMapFull)?;
        *slot = desc;
        self.len += 1;
        Ok(())
    }

    /// All descriptors, terminator included.
    pub fn as_slice(&self) -> &[MemoryRegionDescriptor] {
        &self.table[..self.len]
    }

    /// Regions without the terminator.
    pub fn regions(&self) -> &[MemoryRegionDescriptor] {
        &self.table[..self.len.saturating_sub(1)]
    }

    pub fn as_ptr(&self) -> *const MemoryRegionDescriptor {
        self.table.as_ptr()
    }
}
