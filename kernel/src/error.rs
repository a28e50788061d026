//! Kernel error taxonomy.
//!
//! Replaces the raw `errno` integers the original kernel threaded through
//! every call site with a closed `enum`. Every kernel entry point returns a
//! [`KernelResult`]; the syscall dispatch boundary (`syscall::dispatch`) is
//! the only place a [`KernelError`] is flattened back into an errno.

use core::fmt;

/// Main kernel error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "kernel errors must be handled, not silently discarded"]
pub enum KernelError {
    /// Physical memory or kernel heap exhaustion.
    OutOfMemory,
    /// The process table has no free PID; retryable once a slot frees up.
    NoFreePid,
    /// A syscall argument was out of range or otherwise malformed.
    InvalidArgument,
    /// A user-space pointer did not resolve to mapped, accessible memory.
    BadAddress,
    /// `callno` did not match any entry in the dispatch table.
    NoSuchSyscall,
    /// VFS-origin error: target is a directory.
    IsADirectory,
    /// VFS-origin error: target is not a directory.
    NotADirectory,
    /// VFS-origin error: no such file or directory.
    NotFound,
    /// VFS-origin error: target already exists.
    AlreadyExists,
    /// Deliberately unimplemented.
    Unimplemented,
}

/// Result type alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Flatten to the conventional errno value surfaced to user space.
    pub const fn to_errno(self) -> i32 {
        match self {
            Self::OutOfMemory => 12,      // ENOMEM
            Self::NoFreePid => 11,        // EAGAIN
            Self::InvalidArgument => 22,  // EINVAL
            Self::BadAddress => 14,       // EFAULT
            Self::NoSuchSyscall => 38,    // ENOSYS
            Self::IsADirectory => 21,     // EISDIR
            Self::NotADirectory => 20,    // ENOTDIR
            Self::NotFound => 2,          // ENOENT
            Self::AlreadyExists => 17,    // EEXIST
            Self::Unimplemented => 88,    // EUNIMP (course-local convention)
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::OutOfMemory => "out of memory",
            Self::NoFreePid => "no free process id",
            Self::InvalidArgument => "invalid argument",
            Self::BadAddress => "bad address",
            Self::NoSuchSyscall => "no such syscall",
            Self::IsADirectory => "is a directory",
            Self::NotADirectory => "not a directory",
            Self::NotFound => "no such file or directory",
            Self::AlreadyExists => "already exists",
            Self::Unimplemented => "not implemented",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_mapping_matches_convention() {
        assert_eq!(KernelError::OutOfMemory.to_errno(), 12);
        assert_eq!(KernelError::NoFreePid.to_errno(), 11);
        assert_eq!(KernelError::InvalidArgument.to_errno(), 22);
        assert_eq!(KernelError::BadAddress.to_errno(), 14);
        assert_eq!(KernelError::NoSuchSyscall.to_errno(), 38);
    }

    #[test]
    fn display_is_human_readable() {
        extern crate alloc;
        assert_eq!(alloc::format!("{}", KernelError::BadAddress), "bad address");
    }
}
