//! Board quirk sequences against the in-memory register model.

use bsp_board::*;
use bsp_regs::RegisterBlock;
use bsp_regs::mock::{MockDelay, MockRegisters};

fn cru_with_gpll(fbdiv: u32) -> MockRegisters {
    let cru = MockRegisters::hiword_masked();
    // Normal mode, refdiv 3, postdiv1 1, postdiv2 1.
    cru.set(0x80, fbdiv).set(0x84, 0x1103).set(0x8c, 0x100);
    cru
}

#[test]
fn pwm_workaround_writes_both_channels() {
    let pwm = MockRegisters::new();
    pwm_workaround(&pwm);
    assert_eq!(
        pwm.writes(),
        [
            (0x24, 0x4b7),
            (0x28, 0x27f),
            (0x2c, 0x13),
            (0x34, 0x4b7),
            (0x38, 0x27f),
            (0x3c, 0x13),
        ]
    );
}

#[test]
fn iomux_offsets() {
    let pin = |b, p, i| Pin::new(b, p, i).unwrap();
    assert_eq!(pin(GpioBank::Gpio0, GpioPort::A, 7).iomux_offset(), 0x0);
    assert_eq!(pin(GpioBank::Gpio1, GpioPort::D, 0).iomux_offset(), 0x1c);
    assert_eq!(pin(GpioBank::Gpio2, GpioPort::A, 0).iomux_offset(), 0xe000);
    assert_eq!(pin(GpioBank::Gpio4, GpioPort::B, 5).iomux_offset(), 0xe024);
    assert_eq!(pin(GpioBank::Gpio4, GpioPort::B, 5).iomux_shift(), 10);
}

#[test]
fn set_function_uses_the_right_grf() {
    let grf = MockRegisters::hiword_masked();
    let pmugrf = MockRegisters::hiword_masked();
    grf.set(0xe028, 0xffff);
    let iomux = Iomux::new(&grf, &pmugrf);

    iomux
        .set_function(GpioBank::Gpio4, GpioPort::C, 3, GpioFunction::Func2)
        .unwrap();
    iomux
        .set_function(GpioBank::Gpio1, GpioPort::D, 7, GpioFunction::Func1)
        .unwrap();

    assert_eq!(grf.writes(), [(0xe028, 0x00c0_0080)]);
    assert_eq!(grf.read32(0xe028), 0xffbf);
    assert_eq!(pmugrf.writes(), [(0x1c, 0xc000_4000)]);
    assert_eq!(iomux.function(GpioBank::Gpio4, GpioPort::C, 3), Ok(2));
    assert_eq!(iomux.function(GpioBank::Gpio1, GpioPort::D, 7), Ok(1));
}

#[test]
fn invalid_pin_is_rejected() {
    let grf = MockRegisters::hiword_masked();
    let iomux = Iomux::new(&grf, &grf);
    assert_eq!(
        iomux.set_function(GpioBank::Gpio3, GpioPort::D, 8, GpioFunction::Gpio),
        Err(BoardError::InvalidPin {
            bank: 3,
            port: 'D',
            pin: 8
        })
    );
    assert!(grf.writes().is_empty());
}

#[test]
fn mmc_controller_preparation() {
    let cru = cru_with_gpll(100);
    cru.set(0x318, 0x2).set(0x140, 0x0200);
    let grf = MockRegisters::hiword_masked();
    let pmugrf = MockRegisters::hiword_masked();
    let mut delay = MockDelay::new();

    prepare_mmc_controller(&cru, &grf, &pmugrf, &mut delay).unwrap();

    assert_eq!(
        cru.writes(),
        [
            (0x41c, 0x0400_0400),
            (0x41c, 0x0400_0000),
            (0x140, 0x0700_0100),
            (0x140, 0x007f_0007),
            (0x318, 0x0002_0000),
        ]
    );
    assert_eq!(cru.read32(0x140), 0x0107);
    assert_eq!(cru.read32(0x318), 0);
    assert_eq!((delay.total_us, delay.calls), (5, 1));

    assert_eq!(
        grf.writes(),
        [
            (0xe024, 0x0300_0100),
            (0xe024, 0x0c00_0400),
            (0xe024, 0x0003_0001),
            (0xe024, 0x000c_0004),
            (0xe024, 0x0030_0010),
            (0xe024, 0x00c0_0040),
        ]
    );
    assert_eq!(grf.read32(0xe024), 0x0555);
    assert_eq!(pmugrf.writes(), [(0x0, 0xc000_4000), (0x4, 0x0003_0001)]);
}

#[test]
fn mmc_clock_is_left_alone_when_gpll_is_not_800mhz() {
    // 24 * 99 / 3 = 792 MHz
    let cru = cru_with_gpll(99);
    let grf = MockRegisters::hiword_masked();
    let pmugrf = MockRegisters::hiword_masked();
    let mut delay = MockDelay::new();

    prepare_mmc_controller(&cru, &grf, &pmugrf, &mut delay).unwrap();

    assert_eq!(cru.writes().len(), 2);
    assert_eq!(grf.writes().len(), 6);
    assert_eq!(pmugrf.writes().len(), 2);
}
