use bsp_regs::RegisterBlock;

use crate::regs::*;
use crate::{ClockError, CPLL_HZ, DEEP_SLOW_HZ, GPLL_HZ, KHZ, MHZ, NPLL_HZ, OSC_HZ, PPLL_HZ};

pub const VCO_MIN_KHZ: u32 = 800 * (MHZ / KHZ);
pub const VCO_MAX_KHZ: u32 = 3200 * (MHZ / KHZ);
pub const OUTPUT_MIN_KHZ: u32 = 16 * (MHZ / KHZ);
pub const OUTPUT_MAX_KHZ: u32 = 3200 * (MHZ / KHZ);

/// Feedback divider limits in integer mode.
pub const PLL_DIV_MIN: u32 = 16;
pub const PLL_DIV_MAX: u32 = 3200;

pub const MAX_REFDIV: u32 = 63;
pub const MAX_POSTDIV1: u32 = 7;
pub const MAX_POSTDIV2: u32 = 7;

/// The match error tolerated by [`PllDivisors::search`].
pub const MAX_MATCH_DIFF_KHZ: u32 = 4 * (MHZ / KHZ);

/// The eight PLLs of the SoC.
///
/// All of them share the same six-register CON0..CON5 layout; PPLL lives in
/// the PMU CRU, every other PLL in the main CRU.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Pll {
    Ppll,
    ApllL,
    ApllB,
    Dpll,
    Cpll,
    Gpll,
    Npll,
    Vpll,
}

impl Pll {
    pub const ALL: [Pll; 8] = [
        Pll::Ppll,
        Pll::ApllL,
        Pll::ApllB,
        Pll::Dpll,
        Pll::Cpll,
        Pll::Gpll,
        Pll::Npll,
        Pll::Vpll,
    ];

    pub const fn con_base(self) -> usize {
        match self {
            Pll::Ppll => 0x00,
            Pll::ApllL => 0x00,
            Pll::ApllB => 0x20,
            Pll::Dpll => 0x40,
            Pll::Cpll => 0x60,
            Pll::Gpll => 0x80,
            Pll::Npll => 0xa0,
            Pll::Vpll => 0xc0,
        }
    }

    pub const fn con(self, n: usize) -> usize {
        self.con_base() + n * 4
    }

    pub const fn in_pmucru(self) -> bool {
        matches!(self, Pll::Ppll)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct PllDivisors {
    pub refdiv: u32,
    pub fbdiv: u32,
    pub postdiv1: u32,
    pub postdiv2: u32,
    pub frac: u32,
    pub freq: u32,
}

impl PllDivisors {
    pub const PPLL: Self = Self::for_rate(PPLL_HZ, 2, 2, 1);
    pub const GPLL: Self = Self::for_rate(GPLL_HZ, 1, 3, 1);
    pub const NPLL: Self = Self::for_rate(NPLL_HZ, 1, 3, 1);
    pub const CPLL: Self = Self::for_rate(CPLL_HZ, 1, 3, 1);
    pub const APLL_1700: Self = Self::for_rate(1700 * MHZ, 1, 1, 1);
    pub const APLL_1600: Self = Self::for_rate(1600 * MHZ, 3, 1, 1);
    pub const APLL_1300: Self = Self::for_rate(1300 * MHZ, 1, 1, 1);
    pub const APLL_816: Self = Self::for_rate(816 * MHZ, 1, 2, 1);
    pub const APLL_600: Self = Self::for_rate(600 * MHZ, 1, 2, 1);

    pub const fn for_rate(hz: u32, refdiv: u32, postdiv1: u32, postdiv2: u32) -> Self {
        let fbdiv = (hz as u64 * refdiv as u64 * postdiv1 as u64 * postdiv2 as u64
            / OSC_HZ as u64) as u32;
        Self {
            refdiv,
            fbdiv,
            postdiv1,
            postdiv2,
            frac: 0,
            freq: hz,
        }
    }

    /// VCO frequency in kHz, or `None` for a zero reference divider.
    pub const fn vco_khz(&self) -> Option<u32> {
        if self.refdiv == 0 {
            return None;
        }
        Some(OSC_HZ / KHZ * self.fbdiv / self.refdiv)
    }

    pub const fn output_khz(&self) -> Option<u32> {
        match self.vco_khz() {
            Some(vco) if self.postdiv1 != 0 && self.postdiv2 != 0 => {
                Some(vco / self.postdiv1 / self.postdiv2)
            }
            _ => None,
        }
    }

    /// Checks the VCO, output and feedback divider limits that every PLL shares,
    /// and that each divisor fits its register field.
    ///
    /// # Errors
    /// Returns [`ClockError::InvalidDivisors`] if any limit is violated.
    pub fn validate(&self) -> Result<(), ClockError> {
        let invalid = ClockError::InvalidDivisors(*self);
        if self.refdiv > MAX_REFDIV
            || self.postdiv1 > MAX_POSTDIV1
            || self.postdiv2 > MAX_POSTDIV2
        {
            return Err(invalid);
        }
        let (Some(vco), Some(output)) = (self.vco_khz(), self.output_khz()) else {
            return Err(invalid);
        };
        if !(VCO_MIN_KHZ..=VCO_MAX_KHZ).contains(&vco)
            || !(OUTPUT_MIN_KHZ..=OUTPUT_MAX_KHZ).contains(&output)
            || !(PLL_DIV_MIN..=PLL_DIV_MAX).contains(&self.fbdiv)
        {
            return Err(invalid);
        }
        Ok(())
    }

    /// Finds integer-mode divisors for `freq_hz`.
    ///
    /// The post dividers are chosen first so that the VCO lands just above its
    /// minimum, then every reference divider is tried until an exact match is
    /// found. The closest candidate wins; ties keep the smaller `refdiv`.
    ///
    /// # Errors
    /// Fails for 0 Hz, when no VCO frequency in range can be reached with the
    /// post dividers, or when the best match is off by more than 4 MHz.
    pub fn search(freq_hz: u32) -> Result<Self, ClockError> {
        if freq_hz == 0 {
            return Err(ClockError::ZeroFrequency);
        }
        let ref_khz = OSC_HZ / KHZ;
        let freq_khz = freq_hz / KHZ;
        if freq_khz == 0 {
            return Err(ClockError::NoSupportedVco { freq_hz });
        }

        let mut postdiv1 = VCO_MIN_KHZ.div_ceil(freq_khz);
        let mut postdiv2 = 1;
        if postdiv1 > MAX_POSTDIV1 {
            postdiv2 = postdiv1.div_ceil(MAX_POSTDIV1);
            postdiv1 = postdiv1.div_ceil(postdiv2);
        }

        let vco_khz = u64::from(freq_khz) * u64::from(postdiv1) * u64::from(postdiv2);
        if vco_khz < u64::from(VCO_MIN_KHZ)
            || vco_khz > u64::from(VCO_MAX_KHZ)
            || postdiv2 > MAX_POSTDIV2
        {
            return Err(ClockError::NoSupportedVco { freq_hz });
        }
        let vco_khz = vco_khz as u32;

        let mut best = Self {
            refdiv: 0,
            fbdiv: 0,
            postdiv1,
            postdiv2,
            frac: 0,
            freq: freq_hz,
        };
        let mut best_diff_khz = vco_khz;

        let mut refdiv = 1;
        while refdiv < MAX_REFDIV && best_diff_khz != 0 {
            let fref_khz = ref_khz / refdiv;
            let mut fbdiv = vco_khz / fref_khz;
            if fbdiv >= PLL_DIV_MAX || fbdiv <= PLL_DIV_MIN {
                refdiv += 1;
                continue;
            }
            let mut diff_khz = vco_khz - fbdiv * fref_khz;
            if fbdiv + 1 < PLL_DIV_MAX && diff_khz > fref_khz / 2 {
                fbdiv += 1;
                diff_khz = fref_khz - diff_khz;
            }
            if diff_khz < best_diff_khz {
                best_diff_khz = diff_khz;
                best.refdiv = refdiv;
                best.fbdiv = fbdiv;
            }
            refdiv += 1;
        }

        if best_diff_khz > MAX_MATCH_DIFF_KHZ {
            return Err(ClockError::MatchError {
                freq_hz,
                diff_hz: best_diff_khz * KHZ,
            });
        }
        Ok(best)
    }
}

/// Decodes the current output rate of the PLL whose CON0 sits at `con_base`.
///
/// Normal mode truncates to whole megahertz. A zero divisor read back from
/// the hardware reports 0 Hz.
pub fn read_pll_rate<R: RegisterBlock + ?Sized>(regs: &R, con_base: usize) -> u32 {
    let con3 = regs.read32(con_base + 0xc);
    match (con3 & PLL_MODE_MASK) >> PLL_MODE_SHIFT {
        PLL_MODE_SLOW => OSC_HZ,
        PLL_MODE_NORM => {
            let fbdiv = regs.read32(con_base) & PLL_FBDIV_MASK;
            let con1 = regs.read32(con_base + 0x4);
            let postdiv1 = (con1 & PLL_POSTDIV1_MASK) >> PLL_POSTDIV1_SHIFT;
            let postdiv2 = (con1 & PLL_POSTDIV2_MASK) >> PLL_POSTDIV2_SHIFT;
            let refdiv = con1 & PLL_REFDIV_MASK;
            let div = refdiv * postdiv1 * postdiv2;
            if div == 0 {
                return 0;
            }
            (24 * fbdiv / div) * MHZ
        }
        _ => DEEP_SLOW_HZ,
    }
}
