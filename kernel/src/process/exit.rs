//! `_exit`: terminate the calling process.
//!
//! Grounded on `sys__exit`'s reparent-then-wake sequence: the table
//! does the bookkeeping (`mark_exited`), then every thread blocked in
//! `waitpid` for this pid is woken to re-check.

use super::pcb::ProcessId;
use super::table;
use crate::sync::sleepq;

/// Wait channel a `waitpid(pid, ..)` call blocks on. A plain cast of the
/// pid rather than an object address, since parent and child have no
/// shared value to derive a channel from otherwise.
pub fn channel_for(pid: ProcessId) -> usize {
    pid as usize
}

/// Record `exit_code`, reparent any children to init, and wake whoever
/// is waiting on this pid.
pub fn exit_process(pid: ProcessId, exit_code: i32) {
    table::mark_exited(pid, exit_code);
    sleepq::wake_all(channel_for(pid));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::pcb::ProcessState;
    use alloc::string::String;

    extern crate std;
    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn exit_marks_zombie_with_its_exit_code() {
        let _guard = TEST_LOCK.lock().unwrap();
        let pid = table::alloc(None, String::from("a")).unwrap();
        exit_process(pid, 7);
        assert_eq!(table::state(pid), Some(ProcessState::Zombie));
        assert_eq!(table::exit_code(pid), Some(7));
        table::reap(pid);
    }
}
