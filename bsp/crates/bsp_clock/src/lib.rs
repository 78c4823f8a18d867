//! RK3399 clock and reset unit.
//!
//! [`PllDivisors`] holds the integer-mode divisor math, [`Cru`] programs the
//! CRU and PMU CRU register blocks: PLLs, CPU cluster clocks, the peripheral
//! bus trees and the display clocks.

#![no_std]

mod cru;
mod id;
mod pll;
pub mod regs;

pub use cru::*;
pub use id::*;
pub use pll::*;
use thiserror::Error;

pub const KHZ: u32 = 1_000;
pub const MHZ: u32 = 1_000_000;

pub const OSC_HZ: u32 = 24 * MHZ;
pub const GPLL_HZ: u32 = 800 * MHZ;
pub const CPLL_HZ: u32 = 800 * MHZ;
pub const NPLL_HZ: u32 = 1000 * MHZ;
pub const PPLL_HZ: u32 = 676 * MHZ;

pub const PMU_PCLK_HZ: u32 = 48 * MHZ;

pub const ACLKM_CORE_HZ: u32 = 300 * MHZ;
pub const ATCLK_CORE_HZ: u32 = 300 * MHZ;
pub const PCLK_DBG_HZ: u32 = 100 * MHZ;

pub const PERIHP_ACLK_HZ: u32 = 150 * MHZ;
pub const PERIHP_HCLK_HZ: u32 = 75 * MHZ;
pub const PERIHP_PCLK_HZ: u32 = 37_500 * KHZ;

pub const PERILP0_ACLK_HZ: u32 = 300 * MHZ;
pub const PERILP0_HCLK_HZ: u32 = 100 * MHZ;
pub const PERILP0_PCLK_HZ: u32 = 50 * MHZ;

pub const PERILP1_HCLK_HZ: u32 = 100 * MHZ;
pub const PERILP1_PCLK_HZ: u32 = 50 * MHZ;

/// Rate reported for a PLL in deep-slow mode.
pub const DEEP_SLOW_HZ: u32 = 32_768;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum ClockError {
    #[error("the frequency can't be 0 Hz")]
    ZeroFrequency,
    #[error("no supported VCO for {freq_hz} Hz")]
    NoSupportedVco { freq_hz: u32 },
    #[error("failed to match {freq_hz} Hz, difference is {diff_hz} Hz")]
    MatchError { freq_hz: u32, diff_hz: u32 },
    #[error("PLL divisors out of range: {0:?}")]
    InvalidDivisors(PllDivisors),
    #[error("divider {0} does not fit its register field")]
    DividerOutOfRange(u32),
    #[error("{0:?} did not lock")]
    LockTimeout(Pll),
    #[error("no rate available for {0:?}")]
    UnknownClock(ClockId),
}
