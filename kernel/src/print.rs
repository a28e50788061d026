//! `kprint!`/`kprintln!`: unbuffered console output for early boot and
//! the panic path, bypassing [`klog`] so a panic mid-log can't reenter
//! the logger.

use core::fmt;

use spin::Mutex;

use crate::hal::console::ConsoleDevice;

static CONSOLE: Mutex<Option<&'static dyn ConsoleDevice>> = Mutex::new(None);

/// Register the console `kprint!`/`kprintln!` write to. Must run once
/// at boot before either macro is used.
pub fn set_console(console: &'static dyn ConsoleDevice) {
    *CONSOLE.lock() = Some(console);
}

struct ConsoleWriter;

impl fmt::Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(console) = *CONSOLE.lock() {
            for byte in s.bytes() {
                console.putch(byte);
            }
        }
        Ok(())
    }
}

#[doc(hidden)]
pub fn _kprint(args: fmt::Arguments) {
    use core::fmt::Write;
    let _ = ConsoleWriter.write_fmt(args);
}

#[macro_export]
macro_rules! kprint {
    ($($arg:tt)*) => ($crate::print::_kprint(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! kprintln {
    () => ($crate::kprint!("\n"));
    ($($arg:tt)*) => ($crate::kprint!("{}\n", format_args!($($arg)*)));
}
