//! Counting semaphore.
//!
//! Grounded directly on `sem_create`/`P`/`V`: a thread that finds the
//! count at zero sleeps on the semaphore's own address and re-checks the
//! count on every wakeup, since `V` broadcasts rather than handing the
//! token to a specific waiter.

use spin::Mutex;

use super::critical::CriticalSection;
use super::sleepq;

pub struct Semaphore {
    name: &'static str,
    count: Mutex<u32>,
}

impl Semaphore {
    pub const fn new(name: &'static str, initial_count: u32) -> Self {
        Self {
            name,
            count: Mutex::new(initial_count),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `P`: decrement, blocking while the count is zero.
    pub fn wait(&self) {
        loop {
            let _cs = CriticalSection::enter();
            let mut count = self.count.lock();
            if *count > 0 {
                *count -= 1;
                return;
            }
            drop(count);
            sleepq::sleep(sleepq::channel_of(self));
        }
    }

    /// `V`: increment and wake every waiter so they can re-check the count.
    pub fn signal(&self) {
        let _cs = CriticalSection::enter();
        *self.count.lock() += 1;
        sleepq::wake_all(sleepq::channel_of(self));
    }

    /// Current count, for diagnostics and tests only.
    pub fn count(&self) -> u32 {
        *self.count.lock()
    }
}
