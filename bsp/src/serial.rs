#[cfg(all(target_arch = "aarch64", feature = "rk3399"))]
mod rk3399_impl {
    pub fn internal_print(args: core::fmt::Arguments) {
        use core::fmt::Write;

        use crate::arch::aarch64::platform::rk3399::UART;

        let _ = UART.lock().write_fmt(args);
    }
}

#[cfg(all(target_arch = "aarch64", feature = "rk3399"))]
#[doc(hidden)]
pub use rk3399_impl::internal_print;

// No debug UART on other targets.
#[cfg(not(all(target_arch = "aarch64", feature = "rk3399")))]
#[doc(hidden)]
pub fn internal_print(_args: core::fmt::Arguments) {}

/// Prints to the host through the serial interface.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => ($crate::serial::internal_print(format_args!($($arg)*)));
}

/// Prints to the host through the serial interface, appending a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(
        concat!($fmt, "\n"), $($arg)*));
}
