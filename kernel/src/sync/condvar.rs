//! Condition variable.
//!
//! Grounded on `cv_wait`/`cv_signal`/`cv_broadcast`: `wait` releases the
//! caller's lock and sleeps on the condvar's own address in the same
//! critical section, so a signal sent between the release and the sleep
//! can't be missed, then reacquires the lock once woken. `signal` wakes
//! at most one waiter; `broadcast` wakes them all.

use super::critical::CriticalSection;
use super::lock::Lock;
use super::sleepq;

pub struct CondVar {
    name: &'static str,
}

impl CondVar {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `cv_wait`. `lock` must be held by the caller on entry and is held
    /// again on return.
    pub fn wait(&self, lock: &Lock) {
        let _cs = CriticalSection::enter();
        lock.release();
        sleepq::sleep(sleepq::channel_of(self));
        drop(_cs);
        lock.acquire();
    }

    /// `cv_signal`: wake at most one waiter.
    pub fn signal(&self) {
        let _cs = CriticalSection::enter();
        sleepq::wake_one(sleepq::channel_of(self));
    }

    /// `cv_broadcast`: wake every waiter.
    pub fn broadcast(&self) {
        let _cs = CriticalSection::enter();
        sleepq::wake_all(sleepq::channel_of(self));
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::sync::Arc;

    use super::*;
    use crate::sched::scheduler;

    #[test]
    fn signal_wakes_a_single_waiter() {
        let lock = Arc::new(Lock::new("l"));
        let cv = Arc::new(CondVar::new("cv"));
        let chan = sleepq::channel_of(&*cv);

        let l = lock.clone();
        let c = cv.clone();
        let handle = std::thread::spawn(move || {
            scheduler::set_current(9);
            l.acquire();
            c.wait(&l);
            l.do_i_hold()
        });

        while !scheduler::has_sleepers(chan) {
            std::thread::yield_now();
        }
        scheduler::set_current(1);
        lock.acquire();
        cv.signal();
        lock.release();
        assert!(handle.join().unwrap());
    }
}
