use bsp_regs::RegisterBlock;
use log::{debug, info};

use crate::{PERIPH_BASE, PMU_GRF_OS_REG2};

pub const MAX_CHANNELS: usize = 2;

const SYS_REG_NUM_CH_SHIFT: u32 = 12;

const fn rank_shift(ch: u32) -> u32 {
    11 + ch * 16
}
const fn col_shift(ch: u32) -> u32 {
    9 + ch * 16
}
const fn bk_shift(ch: u32) -> u32 {
    8 + ch * 16
}
const fn cs0_row_shift(ch: u32) -> u32 {
    6 + ch * 16
}
const fn cs1_row_shift(ch: u32) -> u32 {
    4 + ch * 16
}
const fn bw_shift(ch: u32) -> u32 {
    2 + ch * 16
}
const fn row_3_4_shift(ch: u32) -> u32 {
    30 + ch
}

/// Geometry of one DRAM channel as recorded by the DRAM init code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct ChannelInfo {
    pub rank: u32,
    pub col: u32,
    pub bank: u32,
    pub cs0_row: u32,
    pub cs1_row: u32,
    /// Bus width in bytes as a power of two.
    pub bw: u32,
    pub row_3_4: bool,
}

impl ChannelInfo {
    pub const fn decode(sys_reg: u32, ch: u32) -> Self {
        Self {
            rank: 1 + ((sys_reg >> rank_shift(ch)) & 0x1),
            col: 9 + ((sys_reg >> col_shift(ch)) & 0x3),
            bank: 3 - ((sys_reg >> bk_shift(ch)) & 0x1),
            cs0_row: 13 + ((sys_reg >> cs0_row_shift(ch)) & 0x3),
            cs1_row: 13 + ((sys_reg >> cs1_row_shift(ch)) & 0x3),
            bw: 2 >> ((sys_reg >> bw_shift(ch)) & 0x3),
            row_3_4: (sys_reg >> row_3_4_shift(ch)) & 0x1 != 0,
        }
    }

    pub const fn size_mb(&self) -> u64 {
        let mut size = 1u64 << (self.cs0_row + self.col + self.bank + self.bw - 20);
        if self.rank > 1 {
            // A second rank with more rows than the first is not a valid setup.
            size += size >> self.cs0_row.saturating_sub(self.cs1_row);
        }
        if self.row_3_4 {
            size = size * 3 / 4;
        }
        size
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct DramInfo {
    pub channel_count: usize,
    pub channels: [ChannelInfo; MAX_CHANNELS],
}

impl DramInfo {
    pub const fn decode(sys_reg: u32) -> Self {
        let channel_count = 1 + ((sys_reg >> SYS_REG_NUM_CH_SHIFT) & 0x1) as usize;
        let mut channels = [ChannelInfo {
            rank: 0,
            col: 0,
            bank: 0,
            cs0_row: 0,
            cs1_row: 0,
            bw: 0,
            row_3_4: false,
        }; MAX_CHANNELS];
        let mut ch = 0;
        while ch < channel_count {
            channels[ch] = ChannelInfo::decode(sys_reg, ch as u32);
            ch += 1;
        }
        Self {
            channel_count,
            channels,
        }
    }

    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels[..self.channel_count]
    }

    pub fn total_mb(&self) -> u64 {
        self.channels().iter().map(ChannelInfo::size_mb).sum()
    }

    /// Total size in bytes, capped below the SoC register window.
    pub fn size_bytes(&self) -> u64 {
        (self.total_mb() << 20).min(PERIPH_BASE)
    }
}

/// Reads the DRAM geometry from the PMU GRF and returns the usable size in bytes.
pub fn dram_size<R: RegisterBlock + ?Sized>(pmu_grf: &R) -> u64 {
    let info = DramInfo::decode(pmu_grf.read32(PMU_GRF_OS_REG2));
    for (ch, c) in info.channels().iter().enumerate() {
        debug!(
            "ch{}: rank {} col {} bank {} cs0_row {} bw {} row_3_4 {}",
            ch, c.rank, c.col, c.bank, c.cs0_row, c.bw, c.row_3_4
        );
    }
    let size = info.size_bytes();
    info!("memory size={}MB {:#x}", info.total_mb(), size);
    size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_register_is_one_small_channel() {
        let info = DramInfo::decode(0);
        assert_eq!(info.channel_count, 1);
        let ch = info.channels()[0];
        assert_eq!((ch.rank, ch.col, ch.bank, ch.cs0_row, ch.bw), (1, 9, 3, 13, 2));
        assert_eq!(ch.size_mb(), 1 << 7);
    }

    #[test]
    fn second_rank_with_more_rows_adds_full_rank() {
        let ch = ChannelInfo {
            rank: 2,
            col: 10,
            bank: 3,
            cs0_row: 14,
            cs1_row: 15,
            bw: 2,
            row_3_4: false,
        };
        assert_eq!(ch.size_mb(), 1024);
    }
}
