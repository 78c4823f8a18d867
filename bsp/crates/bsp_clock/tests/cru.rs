//! CRU programming sequences against the in-memory register model.

use bsp_clock::regs::{clksel, pmu_clksel};
use bsp_clock::*;
use bsp_regs::mock::{MockDelay, MockRegisters};

fn locked(pmu: bool) -> MockRegisters {
    let regs = MockRegisters::hiword_masked();
    for pll in Pll::ALL.into_iter().filter(|p| p.in_pmucru() == pmu) {
        regs.set(pll.con(2), 1 << 31);
    }
    regs
}

#[test]
fn set_pll_writes_in_order_and_reads_back() {
    let cru = locked(false);
    let pmucru = locked(true);
    let mut delay = MockDelay::new();
    let mut clk = Cru::new(&cru, &pmucru, &mut delay);

    clk.set_pll(Pll::Gpll, &PllDivisors::GPLL).unwrap();

    assert_eq!(
        cru.writes(),
        [
            (0x8c, 0x0300_0000),
            (0x8c, 0x0008_0008),
            (0x80, 0x0fff_0064),
            (0x84, 0x773f_1301),
            (0x8c, 0x0300_0100),
        ]
    );
    assert_eq!(clk.pll_rate(Pll::Gpll), 800 * MHZ);
    drop(clk);
    assert_eq!(delay.calls, 0);
}

#[test]
fn set_pll_rejects_out_of_range_divisors_without_writing() {
    let cru = locked(false);
    let pmucru = locked(true);
    let mut clk = Cru::new(&cru, &pmucru, MockDelay::new());

    let bad = PllDivisors::for_rate(100 * MHZ, 1, 1, 1);
    assert_eq!(
        clk.set_pll(Pll::Cpll, &bad),
        Err(ClockError::InvalidDivisors(bad))
    );
    assert!(cru.writes().is_empty());
}

#[test]
fn set_pll_times_out_in_slow_mode() {
    let cru = MockRegisters::hiword_masked();
    let pmucru = MockRegisters::hiword_masked();
    let mut delay = MockDelay::new();
    let mut clk = Cru::new(&cru, &pmucru, &mut delay);

    assert_eq!(
        clk.set_pll(Pll::Npll, &PllDivisors::NPLL),
        Err(ClockError::LockTimeout(Pll::Npll))
    );
    assert_eq!(clk.pll_rate(Pll::Npll), OSC_HZ);
    drop(clk);
    assert_eq!(delay.total_us, u64::from(PLL_LOCK_POLL_LIMIT));
}

#[test]
fn pll_rate_decodes_modes() {
    let cru = MockRegisters::new();
    let pmucru = MockRegisters::new();
    let clk = Cru::new(&cru, &pmucru, MockDelay::new());

    assert_eq!(clk.pll_rate(Pll::Dpll), OSC_HZ);

    cru.set(Pll::Dpll.con(3), 2 << 8);
    assert_eq!(clk.pll_rate(Pll::Dpll), DEEP_SLOW_HZ);

    // Normal mode with zero dividers read back.
    cru.set(Pll::Dpll.con(3), 1 << 8);
    assert_eq!(clk.pll_rate(Pll::Dpll), 0);

    // 24 * 297 / (8 * 6 * 1) = 148.5, truncated to whole megahertz.
    cru.set(Pll::Dpll.con(0), 297);
    cru.set(Pll::Dpll.con(1), (1 << 12) | (6 << 8) | 8);
    assert_eq!(clk.pll_rate(Pll::Dpll), 148 * MHZ);
}

#[test]
fn configure_cpu_programs_big_cluster() {
    let cru = locked(false);
    let pmucru = locked(true);
    let mut clk = Cru::new(&cru, &pmucru, MockDelay::new());

    clk.configure_cpu(ApllFrequency::Mhz1600, CpuCluster::Big)
        .unwrap();

    assert_eq!(clk.pll_rate(Pll::ApllB), 1600 * MHZ);
    assert_eq!(cru.get(clksel(2)), (4 << 8) | (1 << 6));
    assert_eq!(cru.get(clksel(3)), (15 << 8) | 4);
    assert!(cru.writes_to(Pll::ApllL.con(0)).is_empty());
}

#[test]
fn configure_cpu_writes_exact_core_words() {
    let cru = locked(false);
    let pmucru = locked(true);
    let mut clk = Cru::new(&cru, &pmucru, MockDelay::new());

    clk.configure_cpu(ApllFrequency::Mhz816, CpuCluster::Little)
        .unwrap();
    clk.configure_cpu(ApllFrequency::Mhz1600, CpuCluster::Big)
        .unwrap();

    // Write-enable covers the low five bits plus whatever is being set.
    assert_eq!(cru.writes_to(clksel(0)), [0x011f_0100]);
    assert_eq!(cru.writes_to(clksel(1)), [0x071f_0701]);
    assert_eq!(cru.writes_to(clksel(2)), [0x045f_0440]);
    assert_eq!(cru.writes_to(clksel(3)), [0x0f1f_0f04]);
}

#[test]
fn clock_init_sets_bus_trees_from_gpll() {
    let cru = locked(false);
    let pmucru = locked(true);
    let mut clk = Cru::new(&cru, &pmucru, MockDelay::new());

    clk.pmu_clock_init().unwrap();
    clk.clock_init().unwrap();

    assert_eq!(clk.pll_rate(Pll::Ppll), 672 * MHZ);
    assert_eq!(pmucru.get(pmu_clksel(0)), 13);
    for (pll, rate) in [
        (Pll::ApllL, 816 * MHZ),
        (Pll::ApllB, 816 * MHZ),
        (Pll::Gpll, GPLL_HZ),
        (Pll::Cpll, CPLL_HZ),
        (Pll::Npll, NPLL_HZ),
    ] {
        assert_eq!(clk.clk_get_rate(ClockId::Pll(pll)), Ok(rate), "{pll:?}");
    }

    assert_eq!(cru.get(clksel(0)), 1 << 8);
    assert_eq!(cru.get(clksel(1)), (7 << 8) | 1);
    assert_eq!(cru.get(clksel(12)), 0x4101);
    assert_eq!(cru.get(clksel(19)), 0x033f);
    assert_eq!(cru.get(clksel(56)), 0x3);
    assert_eq!(cru.get(clksel(22)) & 0x3f, 7);

    let expected = [
        (ClockId::AclkPerihp, 133_333_333),
        (ClockId::HclkPerihp, 66_666_666),
        (ClockId::PclkPerihp, 33_333_333),
        (ClockId::AclkPerilp0, 266_666_666),
        (ClockId::HclkPerilp0, 88_888_888),
        (ClockId::PclkPerilp0, 44_444_444),
        (ClockId::HclkPerilp1, 100 * MHZ),
        (ClockId::PclkPerilp1, 50 * MHZ),
        (ClockId::AclkEmmc, 200 * MHZ),
        (ClockId::SclkEmmc, 100 * MHZ),
    ];
    for (id, rate) in expected {
        assert_eq!(clk.clk_get_rate(id), Ok(rate), "{id:?}");
    }
}

#[test]
fn clk_get_rate_fixed_and_unknown_clocks() {
    let cru = MockRegisters::new();
    let pmucru = MockRegisters::new();
    let clk = Cru::new(&cru, &pmucru, MockDelay::new());

    assert_eq!(clk.clk_get_rate(ClockId::SclkUart2), Ok(24_000_000));
    assert_eq!(clk.clk_get_rate(ClockId::DclkVop1), Ok(0));
    assert_eq!(clk.clk_get_rate(ClockId::PclkEfuse1024ns), Ok(0));
    assert_eq!(
        clk.clk_get_rate(ClockId::SclkSaradc),
        Err(ClockError::UnknownClock(ClockId::SclkSaradc))
    );

    // Card clock from the 24 MHz oscillator, divided by 2.
    cru.set(clksel(16), (5 << 8) | 1);
    assert_eq!(clk.clk_get_rate(ClockId::SclkSdmmc), Ok(12 * MHZ));
    cru.set(clksel(16), 4 << 8);
    assert_eq!(
        clk.clk_get_rate(ClockId::SclkSdmmc),
        Err(ClockError::UnknownClock(ClockId::SclkSdmmc))
    );
}

#[test]
fn hdcp_and_vio_share_clksel42() {
    let cru = MockRegisters::hiword_masked();
    let pmucru = MockRegisters::hiword_masked();
    let clk = Cru::new(&cru, &pmucru, MockDelay::new());

    clk.hdcp_set_clk(400 * MHZ).unwrap();
    assert_eq!(cru.get(clksel(42)), (1 << 14) | (1 << 8));
    assert_eq!(cru.get(clksel(43)), (3 << 10) | (3 << 5));

    clk.vio_set_clk(400 * MHZ).unwrap();
    assert_eq!(cru.get(clksel(42)), (1 << 14) | (1 << 8) | (1 << 6) | 1);
    assert_eq!(cru.get(clksel(43)), (3 << 10) | (3 << 5) | 3);

    cru.clear_log();
    assert_eq!(
        clk.hdcp_set_clk(20 * MHZ),
        Err(ClockError::DividerOutOfRange(40))
    );
    assert_eq!(clk.vio_set_clk(0), Err(ClockError::ZeroFrequency));
    assert!(cru.writes().is_empty());
}

#[test]
fn vop_set_clk_drives_dclk_from_vpll() {
    let cru = locked(false);
    let pmucru = locked(true);
    cru.set(clksel(49), 0x0bff);
    let mut clk = Cru::new(&cru, &pmucru, MockDelay::new());

    assert_eq!(clk.vop_set_clk(VopId::Vop0, 148_500_000), Ok(148_500_000));

    assert_eq!(cru.get(clksel(47)), (7 << 8) | (2 << 6) | 1);
    assert_eq!(cru.get(clksel(51)), (2 << 6) | 7);
    assert_eq!(cru.get(clksel(49)), 0);
    assert_eq!(cru.get(Pll::Vpll.con(0)), 297);
    assert_eq!(clk.pll_rate(Pll::Vpll), 148 * MHZ);
    assert!(cru.writes_to(clksel(48)).is_empty());
}

#[test]
fn vop_set_clk_fails_before_touching_vpll() {
    let cru = locked(false);
    let pmucru = locked(true);
    let mut clk = Cru::new(&cru, &pmucru, MockDelay::new());

    assert_eq!(
        clk.vop_set_clk(VopId::Vop1, 10 * MHZ),
        Err(ClockError::NoSupportedVco { freq_hz: 10 * MHZ })
    );
    assert!(cru.writes_to(Pll::Vpll.con(3)).is_empty());
    assert!(cru.writes_to(clksel(50)).is_empty());
}
