//! `read`/`write`/`getpid`/`sbrk`.
//!
//! Grounded on `sys_read`/`sys_write`/`sys_getpid` in
//! `arch/mips/mips/syscall.c`: no file descriptor table exists, so
//! `read`/`write` speak only to the console device on fd 0/1; any other
//! fd is `EINVAL`.

use crate::error::{KernelError, KernelResult};
use crate::hal::console::ConsoleDevice;

use super::pcb::ProcessId;
use super::table;

const STDIN: u32 = 0;
const STDOUT: u32 = 1;

/// Read exactly one byte from the console into `buf[0]`, always
/// returning `1`. Any `fd` other than stdin is rejected.
pub fn read(fd: u32, console: &dyn ConsoleDevice, buf: &mut [u8]) -> KernelResult<usize> {
    if fd != STDIN || buf.is_empty() {
        return Err(KernelError::InvalidArgument);
    }
    buf[0] = console.getch();
    Ok(1)
}

/// Write `buf` to the console a byte at a time, returning the number of
/// bytes written. Any `fd` other than stdout is rejected.
pub fn write(fd: u32, console: &dyn ConsoleDevice, buf: &[u8]) -> KernelResult<usize> {
    if fd != STDOUT {
        return Err(KernelError::InvalidArgument);
    }
    for &byte in buf {
        console.putch(byte);
    }
    Ok(buf.len())
}

pub fn getpid(pid: ProcessId) -> ProcessId {
    pid
}

/// Move the process's break by `increment` bytes (negative shrinks it)
/// and return the break's value *before* the move, matching the `sbrk(2)`
/// convention. The first call establishes the heap region at
/// [`crate::config::HEAP_BASE`].
pub fn sbrk(pid: ProcessId, increment: i32) -> KernelResult<u32> {
    table::with_pcb(pid, |pcb| {
        let old_brk = if pcb.brk == 0 {
            crate::config::HEAP_BASE
        } else {
            pcb.brk
        };

        let new_brk = if increment >= 0 {
            old_brk.checked_add(increment as u32)
        } else {
            old_brk.checked_sub((-increment) as u32)
        }
        .ok_or(KernelError::InvalidArgument)?;

        if new_brk < crate::config::HEAP_BASE
            || new_brk > crate::config::HEAP_BASE + crate::config::HEAP_MAX_SIZE
        {
            return Err(KernelError::InvalidArgument);
        }

        if pcb.brk == 0 {
            pcb.address_space
                .lock()
                .define_region(crate::config::HEAP_BASE, crate::config::HEAP_MAX_SIZE, true)?;
        }
        pcb.brk = new_brk;
        Ok(old_brk)
    })
    .ok_or(KernelError::InvalidArgument)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::fakes::FakeConsole;
    use alloc::string::String;

    extern crate std;
    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn read_pulls_one_byte_from_stdin() {
        let console = FakeConsole::with_input(b"hi");
        let mut buf = [0u8; 4];
        assert_eq!(read(0, &console, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'h');
    }

    #[test]
    fn write_emits_every_byte_to_stdout() {
        let console = FakeConsole::default();
        assert_eq!(write(1, &console, b"ok").unwrap(), 2);
        assert_eq!(console.written(), alloc::vec![b'o', b'k']);
    }

    #[test]
    fn read_on_a_non_stdin_fd_is_rejected() {
        let console = FakeConsole::with_input(b"x");
        let mut buf = [0u8; 1];
        assert_eq!(read(2, &console, &mut buf), Err(KernelError::InvalidArgument));
    }

    #[test]
    fn sbrk_grows_the_heap_and_returns_the_old_break() {
        let _guard = TEST_LOCK.lock().unwrap();
        let pid = table::alloc(None, String::from("a")).unwrap();
        let first = sbrk(pid, 4096).unwrap();
        assert_eq!(first, crate::config::HEAP_BASE);
        let second = sbrk(pid, 4096).unwrap();
        assert_eq!(second, crate::config::HEAP_BASE + 4096);
        table::reap(pid);
    }
}
