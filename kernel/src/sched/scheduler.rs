//! Single-CPU round-robin scheduler.
//!
//! Generalizes the teacher's per-CPU ready queues down to the one queue a
//! uniprocessor simulator needs. "Current thread" is tracked per calling
//! OS thread rather than as one global: under `cargo test` each simulated
//! kernel thread is backed by a real `std::thread`, and blocking a kernel
//! thread on a wait channel needs to actually suspend that OS thread
//! rather than merely record bookkeeping and fall through, which a purely
//! single-threaded model can't provide. On real MIPS hardware there is
//! only ever one execution context calling in, so the same code degrades
//! to the single-CPU case automatically.

extern crate std;

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread_local;

use alloc::vec::Vec;
use core::cell::Cell;

use super::thread::ThreadId;

thread_local! {
    static CURRENT: Cell<Option<ThreadId>> = const { Cell::new(None) };
}

static READY: Mutex<Vec<ThreadId>> = Mutex::new(Vec::new());

struct WaitChannel {
    waiters: Mutex<Vec<ThreadId>>,
    cv: Condvar,
}

impl WaitChannel {
    fn new() -> Self {
        Self {
            waiters: Mutex::new(Vec::new()),
            cv: Condvar::new(),
        }
    }
}

static CHANNELS: Mutex<Option<HashMap<usize, Arc<WaitChannel>>>> = Mutex::new(None);

fn channel(chan: usize) -> Arc<WaitChannel> {
    let mut table = CHANNELS.lock().unwrap();
    let table = table.get_or_insert_with(HashMap::new);
    table
        .entry(chan)
        .or_insert_with(|| Arc::new(WaitChannel::new()))
        .clone()
}

/// Make `tid` runnable, appending it to the back of the ready queue.
pub fn add_ready(tid: ThreadId) {
    READY.lock().unwrap().push(tid);
}

/// The thread presently assigned the CPU on the calling execution
/// context, if any.
pub fn current() -> Option<ThreadId> {
    CURRENT.with(|c| c.get())
}

/// Force the current thread on this execution context, used when seeding
/// the very first thread before any `schedule` call has run.
pub fn set_current(tid: ThreadId) {
    CURRENT.with(|c| c.set(Some(tid)));
}

/// Pop the next ready thread and make it current on this execution
/// context, returning it. `None` if the ready queue is empty.
pub fn schedule() -> Option<ThreadId> {
    let mut ready = READY.lock().unwrap();
    let next = if ready.is_empty() {
        None
    } else {
        Some(ready.remove(0))
    };
    drop(ready);
    CURRENT.with(|c| c.set(next));
    next
}

/// Cooperative yield: the current thread goes to the back of the ready
/// queue and the next ready thread (possibly the same one, if it was
/// alone) becomes current.
pub fn yield_cpu() {
    if let Some(tid) = CURRENT.with(|c| c.take()) {
        READY.lock().unwrap().push(tid);
    }
    schedule();
}

/// Timer-tick entry point. A no-op while a `CriticalSection` is held,
/// mirroring `splhigh` masking the clock interrupt; otherwise equivalent
/// to `yield_cpu`.
pub fn on_tick() {
    if crate::sync::critical::in_critical_section() {
        return;
    }
    yield_cpu();
}

/// Block the calling execution context on `chan` until woken by
/// [`wake_one`] or [`wake_all`].
pub fn sleep_on(chan: usize) {
    let tid = CURRENT.with(|c| c.take());
    let Some(tid) = tid else { return };
    let ch = channel(chan);
    let mut waiters = ch.waiters.lock().unwrap();
    waiters.push(tid);
    let _unused = ch.cv.wait_while(waiters, |w| w.contains(&tid)).unwrap();
    CURRENT.with(|c| c.set(Some(tid)));
}

/// Wake the single longest-waiting thread blocked on `chan`, if any.
pub fn wake_one(chan: usize) {
    let ch = channel(chan);
    let mut waiters = ch.waiters.lock().unwrap();
    if !waiters.is_empty() {
        waiters.remove(0);
        ch.cv.notify_all();
    }
}

/// Wake every thread blocked on `chan`.
pub fn wake_all(chan: usize) {
    let ch = channel(chan);
    let mut waiters = ch.waiters.lock().unwrap();
    waiters.clear();
    ch.cv.notify_all();
}

/// True if at least one thread is blocked on `chan`.
pub fn has_sleepers(chan: usize) -> bool {
    !channel(chan).waiters.lock().unwrap().is_empty()
}
