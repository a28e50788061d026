//! `waitpid`: block until a specific child exits and collect its status.
//!
//! Grounded on `sys_waitpid`: a parent may only wait for its own
//! children; the wait sleeps on the child's exit channel and re-checks
//! on every wake, since `exit_process` wakes every waiter regardless of
//! which pid they were actually blocked for.

use crate::error::{KernelError, KernelResult};
use crate::sync::sleepq;

use super::exit::channel_for;
use super::pcb::{ProcessId, ProcessState};
use super::table;

/// Block the calling process until `child_pid` becomes a zombie, then
/// free its table slot and return its exit code.
pub fn wait_pid(parent_pid: ProcessId, child_pid: ProcessId) -> KernelResult<i32> {
    if table::parent_of(child_pid) != Some(parent_pid) {
        return Err(KernelError::InvalidArgument);
    }

    loop {
        if table::state(child_pid) == Some(ProcessState::Zombie) {
            let code = table::exit_code(child_pid).ok_or(KernelError::InvalidArgument)?;
            table::reap(child_pid);
            return Ok(code);
        }
        sleepq::sleep(channel_for(child_pid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::exit::exit_process;
    use alloc::string::String;

    extern crate std;

    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn wait_returns_immediately_for_an_already_exited_child() {
        let _guard = TEST_LOCK.lock().unwrap();
        let parent = table::alloc(None, String::from("parent")).unwrap();
        let child = table::alloc(Some(parent), String::from("child")).unwrap();
        exit_process(child, 3);
        assert_eq!(wait_pid(parent, child), Ok(3));
        table::reap(parent);
    }

    #[test]
    fn wait_blocks_until_the_child_exits() {
        let _guard = TEST_LOCK.lock().unwrap();
        let parent = table::alloc(None, String::from("parent")).unwrap();
        let child = table::alloc(Some(parent), String::from("child")).unwrap();

        let chan = channel_for(child);
        let handle = std::thread::spawn(move || wait_pid(parent, child));
        while !crate::sched::scheduler::has_sleepers(chan) {
            std::thread::yield_now();
        }
        exit_process(child, 9);
        assert_eq!(handle.join().unwrap(), Ok(9));
        table::reap(parent);
    }

    #[test]
    fn wait_for_a_non_child_is_rejected() {
        let _guard = TEST_LOCK.lock().unwrap();
        let a = table::alloc(None, String::from("a")).unwrap();
        let b = table::alloc(None, String::from("b")).unwrap();
        assert_eq!(wait_pid(a, b), Err(KernelError::InvalidArgument));
        table::reap(a);
        table::reap(b);
    }
}
