//! CRU and PMU CRU register layout.

pub const fn clksel(n: usize) -> usize {
    0x100 + n * 4
}

pub const fn clkgate(n: usize) -> usize {
    0x300 + n * 4
}

pub const fn softrst(n: usize) -> usize {
    0x400 + n * 4
}

pub const fn pmu_clksel(n: usize) -> usize {
    0x80 + n * 4
}

// PLL_CON0
pub const PLL_FBDIV_MASK: u32 = 0xfff;

// PLL_CON1
pub const PLL_POSTDIV2_SHIFT: u32 = 12;
pub const PLL_POSTDIV2_MASK: u32 = 0x7 << PLL_POSTDIV2_SHIFT;
pub const PLL_POSTDIV1_SHIFT: u32 = 8;
pub const PLL_POSTDIV1_MASK: u32 = 0x7 << PLL_POSTDIV1_SHIFT;
pub const PLL_REFDIV_MASK: u32 = 0x3f;

// PLL_CON2
pub const PLL_LOCK_STATUS: u32 = 1 << 31;

// PLL_CON3
pub const PLL_MODE_SHIFT: u32 = 8;
pub const PLL_MODE_MASK: u32 = 3 << PLL_MODE_SHIFT;
pub const PLL_MODE_SLOW: u32 = 0;
pub const PLL_MODE_NORM: u32 = 1;
pub const PLL_MODE_DEEP: u32 = 2;
pub const PLL_DSMPD_SHIFT: u32 = 3;
pub const PLL_DSMPD_MASK: u32 = 1 << PLL_DSMPD_SHIFT;
pub const PLL_INTEGER_MODE: u32 = 1;

// PMUCRU_CLKSEL_CON0
pub const PMU_PCLK_DIV_CON_MASK: u32 = 0x1f;

// CLKSEL_CON0..3 masks sit at bit 0. Fields above the core divider are
// write-enabled only through the bits being set.
// CLKSEL_CON0 / CLKSEL_CON2
pub const ACLKM_CORE_DIV_CON_SHIFT: u32 = 8;
pub const ACLKM_CORE_DIV_CON_MASK: u32 = 0x1f;
pub const CLK_CORE_PLL_SEL_SHIFT: u32 = 6;
pub const CLK_CORE_PLL_SEL_MASK: u32 = 3;
pub const CLK_CORE_PLL_SEL_ALPLL: u32 = 0;
pub const CLK_CORE_PLL_SEL_ABPLL: u32 = 1;
pub const CLK_CORE_DIV_MASK: u32 = 0x1f;

// CLKSEL_CON1 / CLKSEL_CON3
pub const PCLK_DBG_DIV_SHIFT: u32 = 8;
pub const PCLK_DBG_DIV_MASK: u32 = 0x1f;
pub const ATCLK_CORE_DIV_MASK: u32 = 0x1f;

// CLKSEL_CON14 (PERIHP) and CLKSEL_CON23 (PERILP0) share a layout
pub const PERI_PCLK_DIV_SHIFT: u32 = 12;
pub const PERI_PCLK_DIV_MASK: u32 = 0x7 << PERI_PCLK_DIV_SHIFT;
pub const PERI_HCLK_DIV_SHIFT: u32 = 8;
pub const PERI_HCLK_DIV_MASK: u32 = 0x3 << PERI_HCLK_DIV_SHIFT;
pub const PERI_ACLK_PLL_SEL_SHIFT: u32 = 7;
pub const PERI_ACLK_PLL_SEL_MASK: u32 = 1 << PERI_ACLK_PLL_SEL_SHIFT;
pub const PERI_ACLK_DIV_MASK: u32 = 0x1f;

// CLKSEL_CON25 (PERILP1)
pub const PERILP1_PCLK_DIV_SHIFT: u32 = 8;
pub const PERILP1_PCLK_DIV_MASK: u32 = 0x7 << PERILP1_PCLK_DIV_SHIFT;
pub const PERILP1_HCLK_PLL_SEL_SHIFT: u32 = 7;
pub const PERILP1_HCLK_PLL_SEL_MASK: u32 = 1 << PERILP1_HCLK_PLL_SEL_SHIFT;
pub const PERILP1_HCLK_DIV_MASK: u32 = 0x1f;

/// CPLL/GPLL selector value shared by the single-bit bus clock muxes.
pub const BUS_PLL_SEL_CPLL: u32 = 0;
pub const BUS_PLL_SEL_GPLL: u32 = 1;

// CLKSEL_CON21
pub const ACLK_EMMC_PLL_SEL_SHIFT: u32 = 7;
pub const ACLK_EMMC_PLL_SEL_MASK: u32 = 1 << ACLK_EMMC_PLL_SEL_SHIFT;
pub const ACLK_EMMC_DIV_CON_MASK: u32 = 0x1f;

// CLKSEL_CON16 (SDMMC) and CLKSEL_CON22 (EMMC) card clocks
pub const CARD_CLK_PLL_SHIFT: u32 = 8;
pub const CARD_CLK_PLL_MASK: u32 = 0x7 << CARD_CLK_PLL_SHIFT;
pub const CARD_CLK_PLL_SEL_CPLL: u32 = 0;
pub const CARD_CLK_PLL_SEL_GPLL: u32 = 1;
pub const CARD_CLK_PLL_SEL_NPLL: u32 = 2;
pub const CARD_CLK_PLL_SEL_PPLL: u32 = 3;
pub const CARD_CLK_PLL_SEL_24M: u32 = 5;
pub const CARD_CLK_DIV_MASK: u32 = 0x7f;

// CLKSEL_CON42
pub const ACLK_HDCP_PLL_SEL_SHIFT: u32 = 14;
pub const ACLK_HDCP_PLL_SEL_MASK: u32 = 0x3 << ACLK_HDCP_PLL_SEL_SHIFT;
pub const ACLK_HDCP_DIV_CON_SHIFT: u32 = 8;
pub const ACLK_HDCP_DIV_CON_MASK: u32 = 0x1f << ACLK_HDCP_DIV_CON_SHIFT;
pub const ACLK_VIO_PLL_SEL_SHIFT: u32 = 6;
pub const ACLK_VIO_PLL_SEL_MASK: u32 = 0x3 << ACLK_VIO_PLL_SEL_SHIFT;
pub const ACLK_VIO_DIV_CON_MASK: u32 = 0x1f;
pub const ACLK_HDCP_VIO_PLL_SEL_GPLL: u32 = 1;

// CLKSEL_CON43
pub const PCLK_HDCP_DIV_CON_SHIFT: u32 = 10;
pub const PCLK_HDCP_DIV_CON_MASK: u32 = 0x1f << PCLK_HDCP_DIV_CON_SHIFT;
pub const HCLK_HDCP_DIV_CON_SHIFT: u32 = 5;
pub const HCLK_HDCP_DIV_CON_MASK: u32 = 0x1f << HCLK_HDCP_DIV_CON_SHIFT;
pub const PCLK_VIO_DIV_CON_MASK: u32 = 0x1f;

// CLKSEL_CON47 / CLKSEL_CON48
pub const ACLK_VOP_PLL_SEL_SHIFT: u32 = 6;
pub const ACLK_VOP_PLL_SEL_MASK: u32 = 0x3 << ACLK_VOP_PLL_SEL_SHIFT;
pub const ACLK_VOP_PLL_SEL_GPLL: u32 = 2;
pub const ACLK_VOP_DIV_CON_MASK: u32 = 0x1f;
pub const HCLK_VOP_DIV_CON_SHIFT: u32 = 8;
pub const HCLK_VOP_DIV_CON_MASK: u32 = 0x1f << HCLK_VOP_DIV_CON_SHIFT;

// CLKSEL_CON49 / CLKSEL_CON50
pub const DCLK_VOP_DCLK_SEL_SHIFT: u32 = 11;
pub const DCLK_VOP_DCLK_SEL_MASK: u32 = 1 << DCLK_VOP_DCLK_SEL_SHIFT;
pub const DCLK_VOP_DCLK_SEL_DIVOUT: u32 = 0;
pub const DCLK_VOP_PLL_SEL_SHIFT: u32 = 8;
pub const DCLK_VOP_PLL_SEL_MASK: u32 = 3 << DCLK_VOP_PLL_SEL_SHIFT;
pub const DCLK_VOP_PLL_SEL_VPLL: u32 = 0;
pub const DCLK_VOP_DIV_CON_MASK: u32 = 0xff;

// CLKSEL_CON51 / CLKSEL_CON52
pub const CLK_VOP_PWM_PLL_SEL_SHIFT: u32 = 6;
pub const CLK_VOP_PWM_PLL_SEL_MASK: u32 = 0x3 << CLK_VOP_PWM_PLL_SEL_SHIFT;
pub const CLK_VOP_PWM_PLL_SEL_GPLL: u32 = 2;
pub const CLK_VOP_PWM_DIV_CON_MASK: u32 = 0x1f;
