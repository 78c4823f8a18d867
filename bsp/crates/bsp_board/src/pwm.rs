use bsp_regs::RegisterBlock;
use log::debug;

/// Period, duty and control of PWM channels 2 and 3.
const PWM_CHANNEL_SETUP: [(usize, u32); 6] = [
    (0x24, 0x0000_04b7),
    (0x28, 0x0000_027f),
    (0x2c, 0x0000_0013),
    (0x34, 0x0000_04b7),
    (0x38, 0x0000_027f),
    (0x3c, 0x0000_0013),
];

/// Programs PWM channels 2 and 3 with fixed settings. One-shot, at bring-up.
pub fn pwm_workaround<R: RegisterBlock + ?Sized>(pwm: &R) {
    for (offset, value) in PWM_CHANNEL_SETUP {
        pwm.write32(offset, value);
    }
    debug!("pwm: channels 2 and 3 configured");
}
