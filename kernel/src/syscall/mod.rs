//! System-call dispatch: trapframe in, dispatch table out.
//!
//! Grounded on `mips_syscall` in `arch/mips/mips/syscall.c`: read the
//! call number out of `v0`, pull whichever argument registers the call
//! needs, invoke the matching kernel entry point, and flatten the
//! result back into `(v0, a3)`. This is the only place
//! [`KernelError::to_errno`] is called.
//!
//! Register arguments that are themselves bare integers (`fd`, `n`,
//! `pid`, `increment`) come straight out of `a0..a3`. Arguments that are
//! user-space pointers (`buf`, `path`, `argv`) are not decoded here:
//! resolving a user virtual address into kernel-owned bytes is a
//! copyin/copyout operation this crate has no HAL trait for (the same
//! boundary that leaves the user-mode trampoline itself out of scope),
//! so callers that have already done that resolution pass the result in
//! via [`PointerArgs`].

use alloc::string::String;

use crate::error::KernelError;
use crate::hal::console::ConsoleDevice;
use crate::hal::elf::ElfLoader;
use crate::hal::trapframe::Trapframe;
use crate::process::pcb::ProcessId;
use crate::process::{exec, exit, fork, io, wait};
use crate::vm::{Coremap, EvictionSink, SwapSlots};

pub const SYS_REBOOT: u32 = 0;
pub const SYS_FORK: u32 = 2;
pub const SYS_READ: u32 = 3;
pub const SYS_WRITE: u32 = 4;
pub const SYS_EXIT: u32 = 5;
pub const SYS_EXECV: u32 = 6;
pub const SYS_WAITPID: u32 = 7;
pub const SYS_GETPID: u32 = 8;
pub const SYS_SBRK: u32 = 9;

/// External resources a kernel entry point needs, gathered here so
/// `dispatch` doesn't thread each one through by hand.
pub struct Resources<'a> {
    pub console: &'a dyn ConsoleDevice,
    pub elf: &'a dyn ElfLoader,
    pub coremap: &'a Coremap,
    pub sink: &'a dyn EvictionSink,
    pub swap: &'a dyn SwapSlots,
}

/// Already-resolved user-pointer arguments for the calls that need them.
#[derive(Default)]
pub struct PointerArgs<'a> {
    pub read_buf: Option<&'a mut [u8]>,
    pub write_buf: Option<&'a [u8]>,
    pub exec_path: Option<&'a str>,
    pub exec_argv: Option<&'a [String]>,
}

/// What dispatching a syscall did to the calling thread's control flow,
/// beyond the ordinary "return a value in the trapframe" case.
pub enum Outcome {
    /// An ordinary syscall; `frame` already holds the flattened result.
    Returned,
    /// `fork` succeeded. The parent's `frame` already holds the child's
    /// pid; `child_frame` is what the new child thread resumes in.
    Forked {
        child_pid: ProcessId,
        child_frame: Trapframe,
    },
    /// `execv` succeeded and replaced `frame` wholesale; the program
    /// counter must not be advanced past it.
    Execed,
    /// `_exit` ran; the calling thread is now a zombie and never resumes.
    Exited,
}

/// Dispatch one syscall trap for `pid`, mutating `frame` in place.
pub fn dispatch(
    pid: ProcessId,
    frame: &mut Trapframe,
    res: &Resources,
    ptrs: &mut PointerArgs,
) -> Outcome {
    let callno = frame.v0;

    let outcome = match callno {
        SYS_REBOOT => {
            frame.set_success(0);
            Outcome::Returned
        }
        SYS_FORK => match fork::fork_process(pid, frame, res.coremap, res.sink, res.swap) {
            Ok((child_pid, child_frame)) => {
                frame.set_success(child_pid);
                Outcome::Forked {
                    child_pid,
                    child_frame,
                }
            }
            Err(e) => {
                frame.set_error(e.to_errno());
                Outcome::Returned
            }
        },
        SYS_READ => {
            let fd = frame.a0;
            match ptrs.read_buf.as_deref_mut() {
                Some(buf) => match io::read(fd, res.console, buf) {
                    Ok(n) => {
                        frame.set_success(n as u32);
                        Outcome::Returned
                    }
                    Err(e) => {
                        frame.set_error(e.to_errno());
                        Outcome::Returned
                    }
                },
                None => {
                    frame.set_error(KernelError::BadAddress.to_errno());
                    Outcome::Returned
                }
            }
        }
        SYS_WRITE => {
            let fd = frame.a0;
            match ptrs.write_buf {
                Some(buf) => match io::write(fd, res.console, buf) {
                    Ok(n) => {
                        frame.set_success(n as u32);
                        Outcome::Returned
                    }
                    Err(e) => {
                        frame.set_error(e.to_errno());
                        Outcome::Returned
                    }
                },
                None => {
                    frame.set_error(KernelError::BadAddress.to_errno());
                    Outcome::Returned
                }
            }
        }
        SYS_EXIT => {
            exit::exit_process(pid, frame.a0 as i32);
            Outcome::Exited
        }
        SYS_EXECV => match (ptrs.exec_path, ptrs.exec_argv) {
            (Some(path), Some(argv)) => {
                match exec::exec_process(pid, path, argv, res.elf, res.coremap, res.sink, res.swap) {
                    Ok(new_frame) => {
                        *frame = new_frame;
                        Outcome::Execed
                    }
                    Err(e) => {
                        frame.set_error(e.to_errno());
                        Outcome::Returned
                    }
                }
            }
            _ => {
                frame.set_error(KernelError::BadAddress.to_errno());
                Outcome::Returned
            }
        },
        SYS_WAITPID => {
            let child = frame.a0;
            match wait::wait_pid(pid, child) {
                Ok(code) => {
                    frame.a1 = code as u32; // *status, best-effort without a real copyout
                    frame.set_success(child);
                    Outcome::Returned
                }
                Err(e) => {
                    frame.set_error(e.to_errno());
                    Outcome::Returned
                }
            }
        }
        SYS_GETPID => {
            frame.set_success(io::getpid(pid));
            Outcome::Returned
        }
        SYS_SBRK => {
            let increment = frame.a0 as i32;
            match io::sbrk(pid, increment) {
                Ok(old_brk) => {
                    frame.set_success(old_brk);
                    Outcome::Returned
                }
                Err(e) => {
                    frame.set_error(e.to_errno());
                    Outcome::Returned
                }
            }
        }
        _ => {
            frame.set_error(KernelError::NoSuchSyscall.to_errno());
            Outcome::Returned
        }
    };

    if !matches!(outcome, Outcome::Execed | Outcome::Exited) {
        frame.advance_pc();
    }
    outcome
}
