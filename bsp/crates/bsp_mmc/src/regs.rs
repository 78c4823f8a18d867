//! DesignWare MMC register offsets and bit definitions.

use bitflags::bitflags;

pub const CTRL: usize = 0x000;
pub const PWREN: usize = 0x004;
pub const CLKDIV: usize = 0x008;
pub const CLKSRC: usize = 0x00c;
pub const CLKENA: usize = 0x010;
pub const TMOUT: usize = 0x014;
pub const CTYPE: usize = 0x018;
pub const BLKSIZ: usize = 0x01c;
pub const BYTCNT: usize = 0x020;
pub const INTMASK: usize = 0x024;
pub const CMDARG: usize = 0x028;
pub const CMD: usize = 0x02c;
pub const RESP0: usize = 0x030;
pub const RESP1: usize = 0x034;
pub const RESP2: usize = 0x038;
pub const RESP3: usize = 0x03c;
pub const RINTSTS: usize = 0x044;
pub const STATUS: usize = 0x048;
pub const FIFOTH: usize = 0x04c;
pub const UHSREG: usize = 0x074;
pub const BMOD: usize = 0x080;
pub const DBADDR: usize = 0x088;
pub const IDSTS: usize = 0x08c;
pub const IDINTEN: usize = 0x090;
pub const FIFO: usize = 0x200;

pub const CTYPE_1BIT: u32 = 0;
pub const CTYPE_4BIT: u32 = 1;
pub const CTYPE_8BIT: u32 = 1 << 16;

pub const UHS_DDR: u32 = 1 << 16;

bitflags! {
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Cmd: u32 {
        const RESPONSE_EXPECT = 1 << 6;
        const LONG_RESPONSE = 1 << 7;
        const CHECK_RESPONSE_CRC = 1 << 8;
        const DATA_EXPECTED = 1 << 9;
        /// Transfer direction. Reads leave it clear.
        const WRITE = 1 << 10;
        const SEND_AUTO_STOP = 1 << 12;
        const WAIT_PRVDATA_COMPLETE = 1 << 13;
        const STOP_ABORT_CMD = 1 << 14;
        const SEND_INIT = 1 << 15;
        const UPDATE_CLOCK_ONLY = 1 << 21;
        const USE_HOLD_REG = 1 << 29;
        const START = 1 << 31;

        const INDEX = 0x3f;
    }
}

impl Cmd {
    pub const READ: Self = Self::empty();
}

bitflags! {
    /// RINTSTS / INTMASK bits.
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Int: u32 {
        /// Response error.
        const RE = 1 << 1;
        const CMD_DONE = 1 << 2;
        /// Data transfer over.
        const DTO = 1 << 3;
        const TXDR = 1 << 4;
        const RXDR = 1 << 5;
        const RCRC = 1 << 6;
        const DCRC = 1 << 7;
        /// Response timeout.
        const RTO = 1 << 8;
        /// Data read timeout.
        const DRT = 1 << 9;
        /// Data starvation by host timeout.
        const HTO = 1 << 10;
        /// FIFO underrun/overrun.
        const FRUN = 1 << 11;
        /// Hardware locked write error.
        const HLE = 1 << 12;
        /// Start bit error.
        const SBE = 1 << 13;
        /// End bit error.
        const EBE = 1 << 15;
    }
}

impl Int {
    /// Any of these ends a command with a device error.
    pub const COMMAND_ERRORS: Self = Self::EBE
        .union(Self::HLE)
        .union(Self::RTO)
        .union(Self::RCRC)
        .union(Self::RE)
        .union(Self::DCRC)
        .union(Self::DRT)
        .union(Self::SBE);

    pub const READ_ERRORS: Self = Self::DRT.union(Self::SBE).union(Self::EBE).union(Self::DCRC);

    pub const DATA_ERRORS: Self = Self::DRT
        .union(Self::DCRC)
        .union(Self::FRUN)
        .union(Self::HLE)
        .union(Self::HTO)
        .union(Self::SBE)
        .union(Self::EBE);
}

bitflags! {
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Ctrl: u32 {
        const RESET = 1 << 0;
        const FIFO_RESET = 1 << 1;
        const DMA_RESET = 1 << 2;
        const INT_EN = 1 << 4;
        const DMA_EN = 1 << 5;
        const IDMAC_EN = 1 << 25;

        const RESET_ALL = Self::RESET.bits() | Self::FIFO_RESET.bits() | Self::DMA_RESET.bits();
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Bmod: u32 {
        const SWRESET = 1 << 0;
        /// Fixed burst.
        const FB = 1 << 1;
        const ENABLE = 1 << 7;
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Status: u32 {
        const FIFO_EMPTY = 1 << 2;
        const DATA_BUSY = 1 << 9;
    }
}

/// Words currently held in the FIFO.
pub const fn fifo_count(status: u32) -> u32 {
    (status >> 17) & 0x1ff
}
