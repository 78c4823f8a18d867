use bitflags::bitflags;
use log::{debug, trace};

use crate::{EXTRA_SYSTEM_MEMORY_BASE, MemoryConfig, MemoryError};

/// PI resource descriptor types.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceType {
    SystemMemory = 0,
    MemoryMappedIo = 1,
    Io = 2,
    FirmwareDevice = 3,
    MemoryMappedIoPort = 4,
    MemoryReserved = 5,
    IoReserved = 6,
}

bitflags! {
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct ResourceAttributes: u32 {
        const PRESENT = 0x0000_0001;
        const INITIALIZED = 0x0000_0002;
        const TESTED = 0x0000_0004;
        const READ_PROTECTED = 0x0000_0080;
        const WRITE_PROTECTED = 0x0000_0100;
        const EXECUTION_PROTECTED = 0x0000_0200;
        const UNCACHEABLE = 0x0000_0400;
        const WRITE_COMBINEABLE = 0x0000_0800;
        const WRITE_THROUGH_CACHEABLE = 0x0000_1000;
        const WRITE_BACK_CACHEABLE = 0x0000_2000;
        const READ_PROTECTABLE = 0x0010_0000;
        const WRITE_PROTECTABLE = 0x0020_0000;
        const EXECUTION_PROTECTABLE = 0x0040_0000;
    }
}

impl ResourceAttributes {
    /// Attributes of DRAM declared to the DXE core.
    pub const SYSTEM_MEMORY: Self = Self::PRESENT
        .union(Self::INITIALIZED)
        .union(Self::WRITE_COMBINEABLE)
        .union(Self::WRITE_THROUGH_CACHEABLE)
        .union(Self::WRITE_BACK_CACHEABLE)
        .union(Self::TESTED);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResourceDescriptor {
    pub resource_type: ResourceType,
    pub attributes: ResourceAttributes,
    pub physical_start: u64,
    pub length: u64,
}

impl ResourceDescriptor {
    pub const fn end(&self) -> u64 {
        self.physical_start + self.length
    }
}

/// Fixed-capacity list of resource descriptors, in creation order.
#[derive(Debug, Clone)]
pub struct HobList<const N: usize> {
    entries: [ResourceDescriptor; N],
    len: usize,
}

impl<const N: usize> Default for HobList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> HobList<N> {
    pub const fn new() -> Self {
        Self {
            entries: [ResourceDescriptor {
                resource_type: ResourceType::SystemMemory,
                attributes: ResourceAttributes::empty(),
                physical_start: 0,
                length: 0,
            }; N],
            len: 0,
        }
    }

    pub fn build_resource_descriptor(
        &mut self,
        resource_type: ResourceType,
        attributes: ResourceAttributes,
        physical_start: u64,
        length: u64,
    ) -> Result<(), MemoryError> {
        let slot = self.entries.get_mut(self.len).ok_or(MemoryError::HobListFull)?;
        *slot = ResourceDescriptor {
            resource_type,
            attributes,
            physical_start,
            length,
        };
        self.len += 1;
        trace!(
            "resource {:?} {:#x}..{:#x} {:?}",
            resource_type,
            physical_start,
            physical_start + length,
            attributes
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[ResourceDescriptor] {
        &self.entries[..self.len]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ResourceDescriptor> {
        self.as_slice().iter()
    }
}

impl<'a, const N: usize> IntoIterator for &'a HobList<N> {
    type Item = &'a ResourceDescriptor;
    type IntoIter = core::slice::Iter<'a, ResourceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Declares system memory to the DXE core.
///
/// The configured system memory is declared first. Each reserved region is
/// then cut out of the first system memory descriptor that fully contains
/// it: a reserved descriptor is added, the containing descriptor is shrunk
/// to end at the reserved base, and whatever lies above the reserved region
/// becomes a new system memory descriptor. DRAM beyond the configured size
/// is declared at [`EXTRA_SYSTEM_MEMORY_BASE`].
///
/// A `memory_size` of zero falls back to the configured size. Returns the
/// size of the additional memory.
pub fn build_memory_hobs<const N: usize>(
    hobs: &mut HobList<N>,
    config: &MemoryConfig,
    memory_size: u64,
) -> Result<u64, MemoryError> {
    let memory_size = if memory_size == 0 {
        config.system_memory_size
    } else {
        memory_size
    };

    hobs.build_resource_descriptor(
        ResourceType::SystemMemory,
        ResourceAttributes::SYSTEM_MEMORY,
        config.system_memory_base,
        config.system_memory_size,
    )?;

    let mut reserved = config.reserved.iter().peekable();
    let mut i = 0;
    while i < hobs.len() {
        let Some(region) = reserved.peek().copied() else {
            break;
        };
        let hob = hobs.entries[i];
        if hob.resource_type == ResourceType::SystemMemory
            && region.base >= hob.physical_start
            && region.end() <= hob.end()
        {
            hobs.build_resource_descriptor(
                ResourceType::MemoryReserved,
                ResourceAttributes::PRESENT,
                region.base,
                region.size,
            )?;
            hobs.entries[i].length = region.base - hob.physical_start;
            if region.end() < hob.end() {
                hobs.build_resource_descriptor(
                    ResourceType::SystemMemory,
                    hob.attributes,
                    region.end(),
                    hob.end() - region.end(),
                )?;
            }
            debug!("reserved {:#x}..{:#x}", region.base, region.end());
            reserved.next();
        }
        i += 1;
    }

    let additional = config.additional_memory_size(memory_size);
    if additional > 0 {
        hobs.build_resource_descriptor(
            ResourceType::SystemMemory,
            ResourceAttributes::SYSTEM_MEMORY,
            EXTRA_SYSTEM_MEMORY_BASE,
            additional,
        )?;
    }
    Ok(additional)
}
