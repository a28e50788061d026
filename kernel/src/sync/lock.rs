//! Mutual-exclusion lock.
//!
//! Grounded on `lock_acquire`/`lock_release` and their two- and
//! three-argument siblings. The multi-lock acquires exist so a caller
//! that needs several resources at once (the coremap and a process's
//! address space, say) can take them without a fixed global ordering:
//! each attempt grabs what it can and, if a later lock in the set is
//! held, releases everything it is holding and sleeps on the one that
//! blocked it before retrying from the top. This avoids the deadlock a
//! naive "acquire in order, blocking on each" approach would risk when
//! two callers ask for the same two locks in different orders.

use spin::Mutex;

use crate::sched::scheduler::{self, ThreadId};

use super::critical::CriticalSection;
use super::sleepq;

pub struct Lock {
    name: &'static str,
    held: Mutex<bool>,
    holder: Mutex<Option<ThreadId>>,
}

impl Lock {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            held: Mutex::new(false),
            holder: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn try_take(&self) -> bool {
        let mut held = self.held.lock();
        if *held {
            false
        } else {
            *held = true;
            *self.holder.lock() = scheduler::current();
            true
        }
    }

    fn force_release(&self) {
        *self.held.lock() = false;
        *self.holder.lock() = None;
    }

    /// `lock_acquire`.
    pub fn acquire(&self) {
        loop {
            let _cs = CriticalSection::enter();
            if self.try_take() {
                return;
            }
            drop(_cs);
            sleepq::sleep(sleepq::channel_of(self));
        }
    }

    /// `lock_release`.
    pub fn release(&self) {
        let _cs = CriticalSection::enter();
        self.force_release();
        sleepq::wake_all(sleepq::channel_of(self));
    }

    /// `lock_do_i_hold`.
    pub fn do_i_hold(&self) -> bool {
        *self.holder.lock() == scheduler::current()
    }

    /// `lock_acquire_two`.
    pub fn acquire_two(lock1: &Lock, lock2: &Lock) {
        loop {
            let _cs = CriticalSection::enter();
            if lock1.try_take() {
                if lock2.try_take() {
                    return;
                }
                lock1.force_release();
                drop(_cs);
                sleepq::sleep(sleepq::channel_of(lock2));
            } else {
                drop(_cs);
                sleepq::sleep(sleepq::channel_of(lock1));
            }
        }
    }

    /// `lock_release_two`.
    pub fn release_two(lock1: &Lock, lock2: &Lock) {
        let _cs = CriticalSection::enter();
        lock1.force_release();
        lock2.force_release();
        sleepq::wake_all(sleepq::channel_of(lock1));
        sleepq::wake_all(sleepq::channel_of(lock2));
    }

    /// `lock_acquire_three`.
    pub fn acquire_three(lock1: &Lock, lock2: &Lock, lock3: &Lock) {
        loop {
            let _cs = CriticalSection::enter();
            if lock1.try_take() {
                if lock2.try_take() {
                    if lock3.try_take() {
                        return;
                    }
                    lock2.force_release();
                    lock1.force_release();
                    drop(_cs);
                    sleepq::sleep(sleepq::channel_of(lock3));
                } else {
                    lock1.force_release();
                    drop(_cs);
                    sleepq::sleep(sleepq::channel_of(lock2));
                }
            } else {
                drop(_cs);
                sleepq::sleep(sleepq::channel_of(lock1));
            }
        }
    }

    /// `lock_release_three`.
    pub fn release_three(lock1: &Lock, lock2: &Lock, lock3: &Lock) {
        let _cs = CriticalSection::enter();
        lock1.force_release();
        lock2.force_release();
        lock3.force_release();
        sleepq::wake_all(sleepq::channel_of(lock1));
        sleepq::wake_all(sleepq::channel_of(lock2));
        sleepq::wake_all(sleepq::channel_of(lock3));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_then_release_round_trips() {
        scheduler::set_current(1);
        let lock = Lock::new("test");
        lock.acquire();
        assert!(lock.do_i_hold());
        lock.release();
        assert!(!lock.do_i_hold());
    }

    #[test]
    fn acquire_two_takes_both_or_neither() {
        scheduler::set_current(1);
        let lock1 = Lock::new("l1");
        let lock2 = Lock::new("l2");
        Lock::acquire_two(&lock1, &lock2);
        assert!(lock1.do_i_hold());
        assert!(lock2.do_i_hold());
        Lock::release_two(&lock1, &lock2);
        assert!(!lock1.do_i_hold());
        assert!(!lock2.do_i_hold());
    }
}
