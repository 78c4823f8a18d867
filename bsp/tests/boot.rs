//! Bring-up order against the in-memory register model.

use bsp_clock::regs::{clkgate, clksel, softrst};
use bsp_clock::{ClockError, PLL_LOCK_POLL_LIMIT, Pll};
use bsp_memory::{PMU_GRF_OS_REG2, ResourceType};
use bsp_regs::mock::{MockDelay, MockRegisters};
use rk3399_bsp::BspError;
use rk3399_bsp::boot::{SocRegisters, bring_up};
use rk3399_bsp::config::BoardConfig;

fn soc(locked: bool) -> SocRegisters<MockRegisters> {
    let soc = SocRegisters {
        cru: MockRegisters::hiword_masked(),
        pmucru: MockRegisters::hiword_masked(),
        grf: MockRegisters::hiword_masked(),
        pmugrf: MockRegisters::hiword_masked(),
        pwm: MockRegisters::new(),
    };
    if locked {
        for pll in Pll::ALL {
            let block = if pll.in_pmucru() { &soc.pmucru } else { &soc.cru };
            block.set(pll.con(2), 1 << 31);
        }
    }
    // Single channel, 1.5 GiB.
    soc.pmugrf.set(PMU_GRF_OS_REG2, 0x4000_02C0);
    soc
}

#[test]
fn brings_up_clocks_quirks_and_memory() {
    let soc = soc(true);
    let mut delay = MockDelay::new();

    let info = bring_up(&soc, &mut delay, &BoardConfig::RK3399).unwrap();

    assert_eq!(soc.pwm.writes().len(), 6);
    assert_eq!(
        soc.cru.writes_to(softrst(7)),
        [0x0400_0400, 0x0400_0000]
    );
    assert_eq!(soc.cru.get(clksel(16)), 0x0107);
    assert_eq!(soc.cru.get(clkgate(6)) & 0x2, 0);
    assert_eq!(soc.grf.get(0xe024), 0x0555);
    assert!(delay.total_us >= 5);

    assert_eq!(info.memory_size, 0x6000_0000);
    assert_eq!(info.additional_memory, 0x2000_0000);
    let hobs: Vec<_> = info
        .hobs
        .iter()
        .map(|h| (h.resource_type, h.physical_start, h.length))
        .collect();
    assert_eq!(
        hobs,
        [
            (ResourceType::SystemMemory, 0, 0),
            (ResourceType::MemoryReserved, 0, 0x20_0000),
            (ResourceType::SystemMemory, 0x20_0000, 0x07e0_0000),
            (ResourceType::MemoryReserved, 0x0800_0000, 0x40_0000),
            (ResourceType::SystemMemory, 0x0840_0000, 0x37c0_0000),
            (ResourceType::SystemMemory, 0x4000_0000, 0x2000_0000),
        ]
    );
    assert_eq!(info.memory_map.regions().len(), 3);
}

#[test]
fn clock_failure_stops_before_quirks() {
    let soc = soc(false);
    let mut delay = MockDelay::new();

    let err = bring_up(&soc, &mut delay, &BoardConfig::RK3399).err();

    assert_eq!(
        err,
        Some(BspError::Clock(ClockError::LockTimeout(Pll::Ppll)))
    );
    assert!(soc.pwm.writes().is_empty());
    assert!(soc.grf.writes().is_empty());
    assert_eq!(delay.total_us, u64::from(PLL_LOCK_POLL_LIMIT));
}
