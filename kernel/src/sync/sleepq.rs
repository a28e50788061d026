//! Wait-channel abstraction over the scheduler's block/wake queues.
//!
//! Mirrors the original kernel's trick of using the address of the
//! synchronization object itself (a semaphore, lock, or condvar) as the
//! "sleep channel" passed to `thread_sleep`/`thread_wakeup`, so no
//! separate registration step is needed.

use crate::sched::scheduler;

/// Opaque key identifying a wait queue. Two callers that pass the same
/// channel value block on and wake each other.
pub type WaitChannel = usize;

/// Derive a wait channel from the address of `obj`.
pub fn channel_of<T>(obj: &T) -> WaitChannel {
    obj as *const T as usize
}

/// Block the current thread on `chan` until woken.
pub fn sleep(chan: WaitChannel) {
    scheduler::sleep_on(chan);
}

/// Wake the single longest-waiting thread blocked on `chan`, if any.
pub fn wake_one(chan: WaitChannel) {
    scheduler::wake_one(chan);
}

/// Wake every thread blocked on `chan`.
pub fn wake_all(chan: WaitChannel) {
    scheduler::wake_all(chan);
}

/// True if at least one thread is blocked on `chan`.
pub fn has_sleepers(chan: WaitChannel) -> bool {
    scheduler::has_sleepers(chan)
}
