//! Interrupt-priority bracketing.
//!
//! Generalizes `splhigh`/`splx` into an RAII guard. The kernel is modeled
//! as single-CPU cooperative concurrency: the guard does not mask real
//! hardware interrupts (there are none to mask on the host, and the
//! bare-metal interrupt controller is out of scope per the HAL boundary),
//! it only tells the scheduler not to preempt the current thread while
//! held, matching the effect `splhigh` had in the original kernel.

use core::sync::atomic::{AtomicUsize, Ordering};

static DEPTH: AtomicUsize = AtomicUsize::new(0);

/// An entered critical section. Dropping it is `splx`.
#[must_use = "a CriticalSection is only useful while held; binding it to `_` drops it immediately"]
pub struct CriticalSection {
    _private: (),
}

impl CriticalSection {
    /// Equivalent to `splhigh()`. Nests: the outermost guard to drop is the
    /// one that actually lowers the priority back down.
    pub fn enter() -> Self {
        DEPTH.fetch_add(1, Ordering::AcqRel);
        Self { _private: () }
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        DEPTH.fetch_sub(1, Ordering::AcqRel);
    }
}

/// True if any thread currently holds a `CriticalSection`. The scheduler's
/// tick handler consults this to decide whether a timer interrupt may
/// preempt the running thread.
pub fn in_critical_section() -> bool {
    DEPTH.load(Ordering::Acquire) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_and_restores() {
        assert!(!in_critical_section());
        let outer = CriticalSection::enter();
        assert!(in_critical_section());
        {
            let _inner = CriticalSection::enter();
            assert!(in_critical_section());
        }
        assert!(in_critical_section());
        drop(outer);
        assert!(!in_critical_section());
    }
}
