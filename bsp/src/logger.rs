use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

use crate::serial_println;

static LOGGER: SerialLogger = SerialLogger {
    level: crate::config::BoardConfig::RK3399.log_level,
};

pub fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(LOGGER.level);
    Ok(())
}

/// Writes records to the debug UART.
pub struct SerialLogger {
    level: LevelFilter,
}

impl SerialLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

const fn color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[1;31m",
        Level::Warn => "\x1b[1;33m",
        Level::Info => "\x1b[1;94m",
        Level::Debug => "\x1b[1;30m",
        Level::Trace => "\x1b[1;90m",
    }
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial_println!(
                "{}{:5}\x1b[0m [{}] {}",
                color(record.level()),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        // no-op
    }
}

#[cfg(test)]
mod tests {
    use log::Log;

    use super::*;

    #[test]
    fn filters_below_configured_level() {
        let logger = SerialLogger::new(LevelFilter::Info);
        let meta = |level| Metadata::builder().level(level).target("bsp_mmc").build();
        assert!(logger.enabled(&meta(Level::Error)));
        assert!(logger.enabled(&meta(Level::Info)));
        assert!(!logger.enabled(&meta(Level::Debug)));
        assert!(!SerialLogger::new(LevelFilter::Off).enabled(&meta(Level::Error)));
    }

    #[test]
    fn second_init_is_rejected() {
        let _ = init();
        assert!(init().is_err());
    }
}
