use crate::pll::{Pll, PllDivisors};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CpuCluster {
    Little,
    Big,
}

impl CpuCluster {
    pub const fn pll(self) -> Pll {
        match self {
            CpuCluster::Little => Pll::ApllL,
            CpuCluster::Big => Pll::ApllB,
        }
    }

    /// First of the two CLKSEL registers that hold this cluster's dividers.
    pub const fn clksel_base(self) -> usize {
        match self {
            CpuCluster::Little => 0,
            CpuCluster::Big => 2,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ApllFrequency {
    Mhz1700,
    Mhz1600,
    Mhz1300,
    Mhz816,
    Mhz600,
}

impl ApllFrequency {
    pub const fn divisors(self) -> &'static PllDivisors {
        match self {
            ApllFrequency::Mhz1700 => &PllDivisors::APLL_1700,
            ApllFrequency::Mhz1600 => &PllDivisors::APLL_1600,
            ApllFrequency::Mhz1300 => &PllDivisors::APLL_1300,
            ApllFrequency::Mhz816 => &PllDivisors::APLL_816,
            ApllFrequency::Mhz600 => &PllDivisors::APLL_600,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VopId {
    Vop0,
    Vop1,
}

impl VopId {
    pub(crate) const fn aclk_clksel(self) -> usize {
        match self {
            VopId::Vop0 => 47,
            VopId::Vop1 => 48,
        }
    }

    pub(crate) const fn dclk_clksel(self) -> usize {
        match self {
            VopId::Vop0 => 49,
            VopId::Vop1 => 50,
        }
    }

    pub(crate) const fn pwm_clksel(self) -> usize {
        match self {
            VopId::Vop0 => 51,
            VopId::Vop1 => 52,
        }
    }
}

/// Clocks whose rate can be queried through [`Cru::clk_get_rate`](crate::Cru::clk_get_rate).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClockId {
    Pll(Pll),
    SclkUart0,
    SclkUart1,
    SclkUart2,
    SclkUart3,
    PclkHdmiCtrl,
    DclkVop0,
    DclkVop1,
    PclkEfuse1024ns,
    AclkPerihp,
    HclkPerihp,
    PclkPerihp,
    AclkPerilp0,
    HclkPerilp0,
    PclkPerilp0,
    HclkPerilp1,
    PclkPerilp1,
    AclkEmmc,
    SclkEmmc,
    SclkSdmmc,
    SclkSaradc,
    SclkTsadc,
    PclkAlive,
}
