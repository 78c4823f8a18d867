//! RK3399 board quirks: the PWM workaround and the pin and clock setup the
//! SD/MMC controller needs before its driver starts.

#![no_std]

mod iomux;
mod mmc;
mod pwm;

pub use iomux::*;
pub use mmc::*;
pub use pwm::*;
use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum BoardError {
    #[error("GPIO{bank}{port}{pin} does not exist")]
    InvalidPin { bank: u8, port: char, pin: u8 },
}
