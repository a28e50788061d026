//! Syscall trapframe and user-mode entry boundary.
//!
//! Stand-in for the MIPS `struct trapframe` and `mips_usermode`/`md_forkentry`
//! assembly the original kernel drops into on every exception. The register
//! layout below follows the calling convention `syscall::dispatch` expects:
//! `a0..a3` hold up to four arguments, `v0` carries the syscall number on
//! entry and the return value on success, `v1` carries the high word of a
//! 64-bit return, and `a3` is the MIPS-syscall error flag (0 = success,
//! nonzero = `v0` holds an errno).
#[derive(Debug, Clone, Copy, Default)]
pub struct Trapframe {
    pub a0: u32,
    pub a1: u32,
    pub a2: u32,
    pub a3: u32,
    pub v0: u32,
    pub v1: u32,
    pub epc: u32,
}

impl Trapframe {
    /// Advance the saved program counter past the `syscall` instruction
    /// that trapped, so returning to user space resumes at the next one.
    pub fn advance_pc(&mut self) {
        self.epc = self.epc.wrapping_add(4);
    }

    /// Store a successful return: `v0 = value`, `a3 = 0`.
    pub fn set_success(&mut self, value: u32) {
        self.v0 = value;
        self.a3 = 0;
    }

    /// Store a failed return: `v0 = errno`, `a3 != 0`.
    pub fn set_error(&mut self, errno: i32) {
        self.v0 = errno as u32;
        self.a3 = 1;
    }
}

/// Drops a freshly built thread into user mode for the first time.
///
/// Stand-in for `mips_usermode`: on real hardware this never returns,
/// since control passes to user space. The trait is kept returning `()`
/// rather than `!` so test fakes can record the frame they were handed
/// and hand control back to the caller.
pub trait UserModeEntry {
    /// Enter user mode with `frame` as the initial register state.
    fn enter_user_mode(&self, frame: &Trapframe);
}
