use bitflags::bitflags;

use crate::MmcError;

pub const BLOCK_SIZE: usize = 512;
/// Bytes moved by one descriptor.
pub const DMA_BUF_SIZE: usize = BLOCK_SIZE * 8;
/// Pages reserved for the descriptor table.
pub const MAX_DESC_PAGES: usize = 512;

bitflags! {
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Des0: u32 {
        /// Disable completion interrupt.
        const DIC = 1 << 1;
        /// Last descriptor.
        const LD = 1 << 2;
        /// First descriptor.
        const FS = 1 << 3;
        /// Des3 chains to the next descriptor.
        const CH = 1 << 4;
        /// End of ring.
        const ER = 1 << 5;
        const OWN = 1 << 31;
    }
}

const fn des1_bs1(size: usize) -> u32 {
    (size & 0x1fff) as u32
}

/// Internal DMA controller descriptor in chained mode.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct IdmacDescriptor {
    pub des0: u32,
    /// Buffer 1 size.
    pub des1: u32,
    /// Buffer 1 address.
    pub des2: u32,
    /// Next descriptor address.
    pub des3: u32,
}

impl IdmacDescriptor {
    pub fn flags(&self) -> Des0 {
        Des0::from_bits_retain(self.des0)
    }
}

/// Fills `table` with a descriptor chain covering `length` bytes at
/// `buffer`, whose bus addresses are `table_addr` and `buffer_addr`.
///
/// Every descriptor moves [`DMA_BUF_SIZE`] bytes except the last, which
/// moves the rest of the transfer rounded up to whole blocks. Returns the
/// number of descriptors used.
pub fn build_chain(
    table: &mut [IdmacDescriptor],
    table_addr: u32,
    buffer_addr: u32,
    length: usize,
) -> Result<usize, MmcError> {
    if length == 0 {
        return Err(MmcError::InvalidParameter);
    }
    let count = length.div_ceil(DMA_BUF_SIZE);
    let length = length.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    let available = table.len();
    let chain = table
        .get_mut(..count)
        .ok_or(MmcError::DescriptorsExhausted {
            needed: count,
            available,
        })?;

    let stride = size_of::<IdmacDescriptor>() as u32;
    for (i, desc) in (0u32..).zip(chain.iter_mut()) {
        *desc = IdmacDescriptor {
            des0: (Des0::OWN | Des0::CH | Des0::DIC).bits(),
            des1: des1_bs1(DMA_BUF_SIZE),
            des2: buffer_addr.wrapping_add(DMA_BUF_SIZE as u32 * i),
            des3: table_addr.wrapping_add(stride * (i + 1)),
        };
    }

    chain[0].des0 |= Des0::FS.bits();
    let last_index = count - 1;
    let last = &mut chain[last_index];
    last.des0 = (last.flags() | Des0::LD).difference(Des0::DIC | Des0::CH).bits();
    last.des1 = des1_bs1(length - last_index * DMA_BUF_SIZE);
    last.des3 = 0;
    Ok(count)
}

/// Cache maintenance and address translation for buffers handed to the
/// internal DMA controller.
pub trait DmaOps {
    /// Write dirty lines of `addr..addr + len` back to memory.
    fn clean(&mut self, addr: usize, len: usize);

    /// Drop cached lines of `addr..addr + len`.
    fn invalidate(&mut self, addr: usize, len: usize);

    /// Bus address of `addr`. The controller only reaches the low 4 GiB.
    fn bus_address(&self, addr: usize) -> Result<u32, MmcError> {
        u32::try_from(addr).map_err(|_| MmcError::DmaAddress(addr))
    }
}

/// DMA ops for coherent, identity-mapped memory.
#[derive(Debug, Default, Copy, Clone)]
pub struct CoherentDma;

impl DmaOps for CoherentDma {
    fn clean(&mut self, _addr: usize, _len: usize) {}

    fn invalidate(&mut self, _addr: usize, _len: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block_uses_one_descriptor() {
        let mut table = [IdmacDescriptor::default(); 4];
        assert_eq!(build_chain(&mut table, 0x1000, 0x8000, 512), Ok(1));
        let d = table[0];
        assert_eq!(d.flags(), Des0::OWN | Des0::FS | Des0::LD);
        assert_eq!(d.des1, 512);
        assert_eq!(d.des2, 0x8000);
        assert_eq!(d.des3, 0);
        assert_eq!(table[1], IdmacDescriptor::default());
    }

    #[test]
    fn partial_blocks_round_up() {
        let mut table = [IdmacDescriptor::default(); 2];
        build_chain(&mut table, 0, 0, DMA_BUF_SIZE + 100).unwrap();
        assert_eq!(table[0].des1, DMA_BUF_SIZE as u32);
        assert_eq!(table[1].des1, 512);
    }

    #[test]
    fn zero_length_and_short_table_are_rejected() {
        let mut table = [IdmacDescriptor::default(); 2];
        assert_eq!(
            build_chain(&mut table, 0, 0, 0),
            Err(MmcError::InvalidParameter)
        );
        assert_eq!(
            build_chain(&mut table, 0, 0, 3 * DMA_BUF_SIZE),
            Err(MmcError::DescriptorsExhausted {
                needed: 3,
                available: 2
            })
        );
        assert_eq!(table, [IdmacDescriptor::default(); 2]);
    }

    #[test]
    fn coherent_dma_rejects_high_addresses() {
        assert_eq!(CoherentDma.bus_address(0x8000_0000), Ok(0x8000_0000));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            CoherentDma.bus_address(0x1_0000_0000),
            Err(MmcError::DmaAddress(0x1_0000_0000))
        );
    }
}
