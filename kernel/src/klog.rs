//! A [`log::Log`] implementation over the HAL console.
//!
//! Installed once at boot via [`init`]; afterwards kernel code logs
//! through `log::{info, warn, error, trace}` like any other crate in
//! this stack, rather than writing to the console directly (that's what
//! [`crate::print`] is for, reserved for the panic path).

use core::fmt::Write;

use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

use crate::hal::console::ConsoleDevice;

struct ConsoleLogger {
    console: Mutex<Option<&'static dyn ConsoleDevice>>,
}

static LOGGER: ConsoleLogger = ConsoleLogger {
    console: Mutex::new(None),
};

struct Writer<'a>(&'a dyn ConsoleDevice);

impl Write for Writer<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            self.0.putch(byte);
        }
        Ok(())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let Some(console) = *self.console.lock() else {
            return;
        };
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let _ = writeln!(Writer(console), "[{level}] {}", record.args());
    }

    fn flush(&self) {}
}

/// Install the console logger as the global `log` backend. Must run
/// once at boot, before any `log::info!`/etc. call.
pub fn init(console: &'static dyn ConsoleDevice, level: LevelFilter) {
    *LOGGER.console.lock() = Some(console);
    log::set_max_level(level);
    // The only failure mode is calling init twice; a second logger
    // losing the race is harmless here, so the error is ignored.
    let _ = log::set_logger(&LOGGER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::fakes::FakeConsole;

    extern crate std;
    use std::boxed::Box;

    #[test]
    fn logs_with_level_prefix_and_newline() {
        let console: &'static FakeConsole = Box::leak(Box::new(FakeConsole::default()));
        let logger = ConsoleLogger {
            console: Mutex::new(Some(console)),
        };
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("hello"))
                .build(),
        );
        assert_eq!(console.written(), b"[INFO] hello\n".to_vec());
    }
}
