use bsp_regs::{Delay, RegisterBlock};
use log::{debug, error, info, trace};

use crate::pll::{read_pll_rate, Pll, PllDivisors};
use crate::regs::*;
use crate::*;

/// Number of 1 us polls to wait for a PLL to report lock.
pub const PLL_LOCK_POLL_LIMIT: u32 = 10_000;

/// Driver for the main CRU and the PMU CRU.
pub struct Cru<R, D> {
    cru: R,
    pmucru: R,
    delay: D,
}

impl<R, D> Cru<R, D>
where
    R: RegisterBlock,
    D: Delay,
{
    pub fn new(cru: R, pmucru: R, delay: D) -> Self {
        Self { cru, pmucru, delay }
    }

    pub fn cru(&self) -> &R {
        &self.cru
    }

    pub fn pmucru(&self) -> &R {
        &self.pmucru
    }

    pub fn into_parts(self) -> (R, R, D) {
        (self.cru, self.pmucru, self.delay)
    }

    fn pll_block(&self, pll: Pll) -> &R {
        if pll.in_pmucru() {
            &self.pmucru
        } else {
            &self.cru
        }
    }

    pub fn pll_rate(&self, pll: Pll) -> u32 {
        read_pll_rate(self.pll_block(pll), pll.con_base())
    }

    /// Reprograms `pll` in integer mode and switches it back to normal mode
    /// once locked.
    ///
    /// # Errors
    /// Nothing is written if `div` is out of range. [`ClockError::LockTimeout`]
    /// leaves the PLL in slow mode.
    pub fn set_pll(&mut self, pll: Pll, div: &PllDivisors) -> Result<(), ClockError> {
        div.validate()?;
        debug!(
            "{:?}: fbdiv={}, refdiv={}, postdiv1={}, postdiv2={}, vco={} khz, output={} khz",
            pll,
            div.fbdiv,
            div.refdiv,
            div.postdiv1,
            div.postdiv2,
            div.vco_khz().unwrap_or(0),
            div.output_khz().unwrap_or(0),
        );

        let regs = if pll.in_pmucru() {
            &self.pmucru
        } else {
            &self.cru
        };

        // Slow mode keeps the output stable while the dividers change.
        regs.clrsetreg(pll.con(3), PLL_MODE_MASK, PLL_MODE_SLOW << PLL_MODE_SHIFT);
        regs.clrsetreg(pll.con(3), PLL_DSMPD_MASK, PLL_INTEGER_MODE << PLL_DSMPD_SHIFT);
        regs.clrsetreg(pll.con(0), PLL_FBDIV_MASK, div.fbdiv);
        regs.clrsetreg(
            pll.con(1),
            PLL_POSTDIV2_MASK | PLL_POSTDIV1_MASK | PLL_REFDIV_MASK,
            (div.postdiv2 << PLL_POSTDIV2_SHIFT) | (div.postdiv1 << PLL_POSTDIV1_SHIFT) | div.refdiv,
        );

        let mut polls = 0;
        while !regs.is_set32(pll.con(2), PLL_LOCK_STATUS) {
            if polls == PLL_LOCK_POLL_LIMIT {
                return Err(ClockError::LockTimeout(pll));
            }
            self.delay.delay_us(1);
            polls += 1;
        }
        trace!("{pll:?} locked after {polls} us");

        regs.clrsetreg(pll.con(3), PLL_MODE_MASK, PLL_MODE_NORM << PLL_MODE_SHIFT);
        Ok(())
    }

    pub fn configure_cpu(
        &mut self,
        freq: ApllFrequency,
        cluster: CpuCluster,
    ) -> Result<(), ClockError> {
        let div = freq.divisors();
        let apll_hz = div.freq;
        let aclkm_div = core_divider(apll_hz, ACLKM_CORE_HZ)?;
        let pclk_dbg_div = core_divider(apll_hz, PCLK_DBG_HZ)?;
        let atclk_div = core_divider(apll_hz, ATCLK_CORE_HZ)?;

        self.set_pll(cluster.pll(), div)?;

        let parent = match cluster {
            CpuCluster::Little => CLK_CORE_PLL_SEL_ALPLL,
            CpuCluster::Big => CLK_CORE_PLL_SEL_ABPLL,
        };
        let base = cluster.clksel_base();
        self.cru.clrsetreg(
            clksel(base),
            ACLKM_CORE_DIV_CON_MASK | CLK_CORE_PLL_SEL_MASK | CLK_CORE_DIV_MASK,
            (aclkm_div << ACLKM_CORE_DIV_CON_SHIFT) | (parent << CLK_CORE_PLL_SEL_SHIFT),
        );
        self.cru.clrsetreg(
            clksel(base + 1),
            PCLK_DBG_DIV_MASK | ATCLK_CORE_DIV_MASK,
            (pclk_dbg_div << PCLK_DBG_DIV_SHIFT) | atclk_div,
        );
        Ok(())
    }

    pub fn pmu_clock_init(&mut self) -> Result<(), ClockError> {
        self.set_pll(Pll::Ppll, &PllDivisors::PPLL)?;

        let pclk_div = PPLL_HZ / PMU_PCLK_HZ - 1;
        self.pmucru
            .clrsetreg(pmu_clksel(0), PMU_PCLK_DIV_CON_MASK, pclk_div);
        Ok(())
    }

    /// Brings the CPU clusters, the general PLLs and the peripheral bus
    /// clock trees to their boot configuration.
    pub fn clock_init(&mut self) -> Result<(), ClockError> {
        info!("boot PLLs:");
        self.log_pll_rates();

        self.configure_cpu(ApllFrequency::Mhz816, CpuCluster::Little)?;
        self.configure_cpu(ApllFrequency::Mhz816, CpuCluster::Big)?;

        // The bootrom leaves these away from their reset values.
        self.cru.clrsetreg(clksel(12), 0xffff, 0x4101);
        self.cru.clrsetreg(clksel(19), 0xffff, 0x033f);
        self.cru.clrsetreg(clksel(56), 0x0003, 0x0003);

        self.set_pll(Pll::Gpll, &PllDivisors::GPLL)?;
        self.set_pll(Pll::Npll, &PllDivisors::NPLL)?;
        self.set_pll(Pll::Cpll, &PllDivisors::CPLL)?;

        // PERIHP aclk/hclk/pclk
        let aclk_div = GPLL_HZ.div_ceil(PERIHP_ACLK_HZ) - 1;
        let hclk_div = bus_divider(PERIHP_ACLK_HZ, PERIHP_HCLK_HZ, 0x3)?;
        let pclk_div = bus_divider(PERIHP_ACLK_HZ, PERIHP_PCLK_HZ, 0x7)?;
        self.cru.clrsetreg(
            clksel(14),
            PERI_PCLK_DIV_MASK | PERI_HCLK_DIV_MASK | PERI_ACLK_PLL_SEL_MASK | PERI_ACLK_DIV_MASK,
            (pclk_div << PERI_PCLK_DIV_SHIFT)
                | (hclk_div << PERI_HCLK_DIV_SHIFT)
                | (BUS_PLL_SEL_GPLL << PERI_ACLK_PLL_SEL_SHIFT)
                | aclk_div,
        );

        // PERILP0 aclk/hclk/pclk
        let aclk_div = GPLL_HZ.div_ceil(PERILP0_ACLK_HZ) - 1;
        let hclk_div = bus_divider(PERILP0_ACLK_HZ, PERILP0_HCLK_HZ, 0x3)?;
        let pclk_div = bus_divider(PERILP0_ACLK_HZ, PERILP0_PCLK_HZ, 0x7)?;
        self.cru.clrsetreg(
            clksel(23),
            PERI_PCLK_DIV_MASK | PERI_HCLK_DIV_MASK | PERI_ACLK_PLL_SEL_MASK | PERI_ACLK_DIV_MASK,
            (pclk_div << PERI_PCLK_DIV_SHIFT)
                | (hclk_div << PERI_HCLK_DIV_SHIFT)
                | (BUS_PLL_SEL_GPLL << PERI_ACLK_PLL_SEL_SHIFT)
                | aclk_div,
        );

        // PERILP1 hclk from GPLL
        let hclk_div = GPLL_HZ.div_ceil(PERILP1_HCLK_HZ) - 1;
        if hclk_div > 0x1f {
            return Err(ClockError::DividerOutOfRange(hclk_div));
        }
        let pclk_div = bus_divider(PERILP1_HCLK_HZ, PERILP1_PCLK_HZ, 0x7)?;
        self.cru.clrsetreg(
            clksel(25),
            PERILP1_PCLK_DIV_MASK | PERILP1_HCLK_DIV_MASK | PERILP1_HCLK_PLL_SEL_MASK,
            (pclk_div << PERILP1_PCLK_DIV_SHIFT)
                | hclk_div
                | (BUS_PLL_SEL_GPLL << PERILP1_HCLK_PLL_SEL_SHIFT),
        );

        // EMMC aclk at GPLL / 4
        self.cru.clrsetreg(
            clksel(21),
            ACLK_EMMC_PLL_SEL_MASK | ACLK_EMMC_DIV_CON_MASK,
            (BUS_PLL_SEL_GPLL << ACLK_EMMC_PLL_SEL_SHIFT) | (4 - 1),
        );
        self.cru.clrsetreg(clksel(22), 0x3f, 7);

        info!("after clock init:");
        self.log_pll_rates();
        Ok(())
    }

    fn log_pll_rates(&self) {
        for pll in [
            Pll::ApllL,
            Pll::ApllB,
            Pll::Cpll,
            Pll::Dpll,
            Pll::Gpll,
            Pll::Npll,
            Pll::Vpll,
        ] {
            info!("  {:?} = {} Hz", pll, self.pll_rate(pll));
        }
    }

    /// HDCP aclk at `hz`, pclk and hclk at `hz / 2`, all from GPLL.
    pub fn hdcp_set_clk(&self, hz: u32) -> Result<(), ClockError> {
        let aclk_div = gpll_divider(hz)?;
        let hpclk_div = gpll_divider(hz / 2)?;
        self.cru.clrsetreg(
            clksel(42),
            ACLK_HDCP_PLL_SEL_MASK | ACLK_HDCP_DIV_CON_MASK,
            (ACLK_HDCP_VIO_PLL_SEL_GPLL << ACLK_HDCP_PLL_SEL_SHIFT)
                | (aclk_div << ACLK_HDCP_DIV_CON_SHIFT),
        );
        self.cru.clrsetreg(
            clksel(43),
            PCLK_HDCP_DIV_CON_MASK | HCLK_HDCP_DIV_CON_MASK,
            (hpclk_div << PCLK_HDCP_DIV_CON_SHIFT) | (hpclk_div << HCLK_HDCP_DIV_CON_SHIFT),
        );
        Ok(())
    }

    /// VIO aclk at `hz` and pclk at `hz / 2`, both from GPLL.
    pub fn vio_set_clk(&self, hz: u32) -> Result<(), ClockError> {
        let aclk_div = gpll_divider(hz)?;
        let pclk_div = gpll_divider(hz / 2)?;
        self.cru.clrsetreg(
            clksel(42),
            ACLK_VIO_PLL_SEL_MASK | ACLK_VIO_DIV_CON_MASK,
            (ACLK_HDCP_VIO_PLL_SEL_GPLL << ACLK_VIO_PLL_SEL_SHIFT) | aclk_div,
        );
        self.cru
            .clrsetreg(clksel(43), PCLK_VIO_DIV_CON_MASK, pclk_div);
        Ok(())
    }

    /// Sets up the bus clocks of `vop` and drives its pixel clock at `hz`
    /// straight from VPLL. Returns the programmed rate.
    pub fn vop_set_clk(&mut self, vop: VopId, hz: u32) -> Result<u32, ClockError> {
        const ACLK_VOP_HZ: u32 = 400 * MHZ;
        const HCLK_VOP_HZ: u32 = 100 * MHZ;
        const PWM_VOP_HZ: u32 = 100 * MHZ;

        let aclkreg = clksel(vop.aclk_clksel());
        let dclkreg = clksel(vop.dclk_clksel());
        let pwmreg = clksel(vop.pwm_clksel());

        let div = gpll_divider(ACLK_VOP_HZ)?;
        self.cru.clrsetreg(
            aclkreg,
            ACLK_VOP_PLL_SEL_MASK | ACLK_VOP_DIV_CON_MASK,
            (ACLK_VOP_PLL_SEL_GPLL << ACLK_VOP_PLL_SEL_SHIFT) | div,
        );
        let div = gpll_divider(HCLK_VOP_HZ)?;
        self.cru
            .clrsetreg(aclkreg, HCLK_VOP_DIV_CON_MASK, div << HCLK_VOP_DIV_CON_SHIFT);

        let div = gpll_divider(PWM_VOP_HZ)?;
        self.cru.clrsetreg(
            pwmreg,
            CLK_VOP_PWM_PLL_SEL_MASK | CLK_VOP_PWM_DIV_CON_MASK,
            (CLK_VOP_PWM_PLL_SEL_GPLL << CLK_VOP_PWM_PLL_SEL_SHIFT) | div,
        );

        let vpll = PllDivisors::search(hz).inspect_err(|err| {
            error!("failed to configure {vop:?} dclk: {err}");
        })?;
        self.set_pll(Pll::Vpll, &vpll)?;

        self.cru.clrsetreg(
            dclkreg,
            DCLK_VOP_DCLK_SEL_MASK | DCLK_VOP_PLL_SEL_MASK | DCLK_VOP_DIV_CON_MASK,
            (DCLK_VOP_DCLK_SEL_DIVOUT << DCLK_VOP_DCLK_SEL_SHIFT)
                | (DCLK_VOP_PLL_SEL_VPLL << DCLK_VOP_PLL_SEL_SHIFT),
        );
        Ok(hz)
    }

    pub fn clk_get_rate(&self, id: ClockId) -> Result<u32, ClockError> {
        match id {
            ClockId::Pll(pll) => Ok(self.pll_rate(pll)),
            ClockId::SclkUart0 | ClockId::SclkUart1 | ClockId::SclkUart2 | ClockId::SclkUart3 => {
                Ok(OSC_HZ)
            }
            ClockId::PclkHdmiCtrl
            | ClockId::DclkVop0
            | ClockId::DclkVop1
            | ClockId::PclkEfuse1024ns => Ok(0),
            ClockId::AclkPerihp | ClockId::HclkPerihp | ClockId::PclkPerihp => {
                Ok(self.peri_rate(14, id))
            }
            ClockId::AclkPerilp0 | ClockId::HclkPerilp0 | ClockId::PclkPerilp0 => {
                Ok(self.peri_rate(23, id))
            }
            ClockId::HclkPerilp1 | ClockId::PclkPerilp1 => {
                let con = self.cru.read32(clksel(25));
                let src = self.bus_pll_rate((con & PERILP1_HCLK_PLL_SEL_MASK) >> PERILP1_HCLK_PLL_SEL_SHIFT);
                let hclk = src / ((con & PERILP1_HCLK_DIV_MASK) + 1);
                if id == ClockId::HclkPerilp1 {
                    Ok(hclk)
                } else {
                    Ok(hclk / (((con & PERILP1_PCLK_DIV_MASK) >> PERILP1_PCLK_DIV_SHIFT) + 1))
                }
            }
            ClockId::AclkEmmc => {
                let con = self.cru.read32(clksel(21));
                let src = self.bus_pll_rate((con & ACLK_EMMC_PLL_SEL_MASK) >> ACLK_EMMC_PLL_SEL_SHIFT);
                Ok(src / ((con & ACLK_EMMC_DIV_CON_MASK) + 1))
            }
            ClockId::SclkEmmc => self.card_clk_rate(22, id),
            ClockId::SclkSdmmc => self.card_clk_rate(16, id),
            ClockId::SclkSaradc | ClockId::SclkTsadc | ClockId::PclkAlive => {
                Err(ClockError::UnknownClock(id))
            }
        }
    }

    fn bus_pll_rate(&self, sel: u32) -> u32 {
        if sel == BUS_PLL_SEL_GPLL {
            self.pll_rate(Pll::Gpll)
        } else {
            self.pll_rate(Pll::Cpll)
        }
    }

    fn peri_rate(&self, n: usize, id: ClockId) -> u32 {
        let con = self.cru.read32(clksel(n));
        let src = self.bus_pll_rate((con & PERI_ACLK_PLL_SEL_MASK) >> PERI_ACLK_PLL_SEL_SHIFT);
        let aclk = src / ((con & PERI_ACLK_DIV_MASK) + 1);
        match id {
            ClockId::HclkPerihp | ClockId::HclkPerilp0 => {
                aclk / (((con & PERI_HCLK_DIV_MASK) >> PERI_HCLK_DIV_SHIFT) + 1)
            }
            ClockId::PclkPerihp | ClockId::PclkPerilp0 => {
                aclk / (((con & PERI_PCLK_DIV_MASK) >> PERI_PCLK_DIV_SHIFT) + 1)
            }
            _ => aclk,
        }
    }

    fn card_clk_rate(&self, n: usize, id: ClockId) -> Result<u32, ClockError> {
        let con = self.cru.read32(clksel(n));
        let src = match (con & CARD_CLK_PLL_MASK) >> CARD_CLK_PLL_SHIFT {
            CARD_CLK_PLL_SEL_CPLL => self.pll_rate(Pll::Cpll),
            CARD_CLK_PLL_SEL_GPLL => self.pll_rate(Pll::Gpll),
            CARD_CLK_PLL_SEL_NPLL => self.pll_rate(Pll::Npll),
            CARD_CLK_PLL_SEL_PPLL => self.pll_rate(Pll::Ppll),
            CARD_CLK_PLL_SEL_24M => OSC_HZ,
            _ => return Err(ClockError::UnknownClock(id)),
        };
        Ok(src / ((con & CARD_CLK_DIV_MASK) + 1))
    }
}

/// `parent / target - 1` for a CPU cluster divider, which must stay below 0x1f.
fn core_divider(parent: u32, target: u32) -> Result<u32, ClockError> {
    let div = parent / target;
    if div == 0 || div - 1 >= 0x1f {
        return Err(ClockError::DividerOutOfRange(div));
    }
    Ok(div - 1)
}

fn bus_divider(parent: u32, target: u32, max: u32) -> Result<u32, ClockError> {
    let div = parent / target;
    if div == 0 || div - 1 > max {
        return Err(ClockError::DividerOutOfRange(div));
    }
    Ok(div - 1)
}

/// `GPLL / hz - 1`, which must fit a 5-bit field.
fn gpll_divider(hz: u32) -> Result<u32, ClockError> {
    if hz == 0 {
        return Err(ClockError::ZeroFrequency);
    }
    let div = GPLL_HZ / hz;
    if div == 0 || div - 1 >= 32 {
        return Err(ClockError::DividerOutOfRange(div));
    }
    Ok(div - 1)
}
