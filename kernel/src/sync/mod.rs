//! Kernel synchronization primitives.
//!
//! Built directly on the original kernel's `synch.c`: semaphores, locks
//! (including the two- and three-way ordered acquire used to avoid
//! deadlock across multiple resources), and condition variables, all
//! implemented in terms of [`critical::CriticalSection`] (generalizing
//! `splhigh`/`splx`) and [`sleepq`] (generalizing `thread_sleep`/
//! `thread_wakeup`).

pub mod condvar;
pub mod critical;
pub mod lock;
pub mod semaphore;
pub mod sleepq;

pub use condvar::CondVar;
pub use critical::CriticalSection;
pub use lock::Lock;
pub use semaphore::Semaphore;
