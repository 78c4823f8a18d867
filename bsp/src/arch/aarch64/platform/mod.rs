//! Platform-specific code for AArch64 boards

#[cfg(feature = "rk3399")]
pub mod rk3399;

#[cfg(feature = "rk3399")]
pub use rk3399::*;
