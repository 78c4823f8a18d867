//! Board-support package for the Rockchip RK3399.
//!
//! [`boot::bring_up`] runs the ordered clock, quirk and memory setup over any
//! [`RegisterBlock`](bsp_regs::RegisterBlock); the `rk3399` platform module
//! runs it against the real register windows and publishes the eMMC host
//! protocol.

#![no_std]

pub mod arch;
pub mod boot;
pub mod config;
pub mod logger;
pub mod serial;
pub mod uart;

use bsp_board::BoardError;
use bsp_clock::ClockError;
use bsp_memory::MemoryError;
use bsp_mmc::MmcError;
use thiserror::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum BspError {
    #[error("clock setup failed: {0}")]
    Clock(#[from] ClockError),
    #[error("memory map setup failed: {0}")]
    Memory(#[from] MemoryError),
    #[error("board setup failed: {0}")]
    Board(#[from] BoardError),
    #[error("eMMC setup failed: {0}")]
    Mmc(#[from] MmcError),
    #[error("platform already initialised")]
    AlreadyInitialized,
}
