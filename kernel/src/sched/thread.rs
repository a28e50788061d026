//! Kernel thread identity.
//!
//! This kernel runs exactly one kernel thread per process, the common
//! simplification the original assignment itself makes, so a [`ThreadId`]
//! and a [`crate::process::pcb::ProcessId`] name the same underlying
//! process. Keeping the type distinct from `ProcessId` at the scheduler
//! boundary documents that the scheduler only ever reasons about
//! schedulable execution contexts, not process lifecycle.

/// Identifies a schedulable thread of control. Numerically equal to the
/// owning process's id.
pub type ThreadId = u32;

/// Where a thread stands with respect to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Runnable, waiting in the ready queue.
    Ready,
    /// Currently assigned the CPU.
    Running,
    /// Blocked on a wait channel (semaphore, lock, condvar, or waitpid).
    Blocked,
    /// Exited; kept around only until a `waitpid` collects it.
    Zombie,
}
