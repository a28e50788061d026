//! Process and thread lifecycle: the PCB table, pid allocation, fork,
//! exec, exit, wait, and the console/heap syscall surface.

pub mod exec;
pub mod exit;
pub mod fork;
pub mod io;
pub mod pcb;
pub mod table;
pub mod wait;

pub use exec::exec_process;
pub use exit::exit_process;
pub use fork::fork_process;
pub use pcb::{Pcb, ProcessId, ProcessState};
pub use wait::wait_pid;

use alloc::string::String;

use crate::config::INIT_PID;
use crate::error::KernelResult;

/// Create the init process (pid 1), the root of the reparenting tree.
/// Must run once at boot before any `fork`.
pub fn spawn_init() -> KernelResult<ProcessId> {
    let pid = table::alloc(None, String::from("init"))?;
    debug_assert_eq!(pid, INIT_PID);
    Ok(pid)
}
