//! Process control block.
//!
//! Fields mirror what the original kernel threads through `struct
//! proc`/`t_vmspace`/the pid-keyed exit-status table: identity, parent
//! linkage (for reparenting to init and for `waitpid`), the address
//! space, and the slot's lifecycle state.

use alloc::string::String;
use alloc::vec::Vec;

use spin::Mutex;

use crate::config::INIT_PID;
use crate::vm::AddressSpace;

pub type ProcessId = u32;

/// Lifecycle state of a process table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Slot is unused.
    Free,
    /// Running or ready to run (the scheduler tracks finer-grained
    /// run/block state separately).
    Alive,
    /// Exited; `exit_code` is valid, the slot is kept only until a
    /// `waitpid` collects it.
    Zombie,
}

pub struct Pcb {
    pub pid: ProcessId,
    pub parent: Option<ProcessId>,
    pub state: ProcessState,
    pub exit_code: Option<i32>,
    pub name: String,
    pub address_space: Mutex<AddressSpace>,
    pub children: Vec<ProcessId>,
    /// Current break, `sbrk`'s high-water mark. Zero until the first call
    /// establishes the heap region.
    pub brk: u32,
}

impl Pcb {
    pub fn new(pid: ProcessId, parent: Option<ProcessId>, name: String) -> Self {
        Self {
            pid,
            parent,
            state: ProcessState::Alive,
            exit_code: None,
            name,
            address_space: Mutex::new(AddressSpace::new()),
            children: Vec::new(),
            brk: 0,
        }
    }

    /// True if this slot should be reparented to init rather than simply
    /// vanishing, i.e. it has children of its own when it exits.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_init(&self) -> bool {
        self.pid == INIT_PID
    }
}
