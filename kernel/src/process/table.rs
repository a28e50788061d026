//! Fixed-capacity process table.
//!
//! The original allocated a pid by scanning for a free slot and then, in
//! a later step, writing the new process into it — two operations with
//! nothing enforcing they happen atomically, so two callers racing
//! `fork` could scan, both see the same empty slot, and hand out the
//! same pid. Here `alloc` holds the table lock across both the scan and
//! the insert, closing that window.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use spin::Mutex;

use crate::config::{INIT_PID, MAX_PID, MIN_PID};
use crate::error::{KernelError, KernelResult};
use crate::vm::{EvictionSink, Owner, Pte};

use super::pcb::{Pcb, ProcessId, ProcessState};

struct Table {
    slots: Vec<Option<Box<Pcb>>>,
}

static TABLE: Mutex<Table> = Mutex::new(Table { slots: Vec::new() });

fn with_table<R>(f: impl FnOnce(&mut Vec<Option<Box<Pcb>>>) -> R) -> R {
    let mut table = TABLE.lock();
    if table.slots.is_empty() {
        table.slots.resize_with(MAX_PID, || None);
    }
    f(&mut table.slots)
}

/// Allocate the lowest free pid and install a freshly created [`Pcb`] for
/// it, returning the pid.
pub fn alloc(parent: Option<ProcessId>, name: String) -> KernelResult<ProcessId> {
    with_table(|slots| {
        for pid in MIN_PID as usize..MAX_PID {
            if slots[pid].is_none() {
                slots[pid] = Some(Box::new(Pcb::new(pid as ProcessId, parent, name)));
                if let Some(parent_pid) = parent {
                    if let Some(Some(parent_pcb)) = slots.get_mut(parent_pid as usize) {
                        parent_pcb.children.push(pid as ProcessId);
                    }
                }
                return Ok(pid as ProcessId);
            }
        }
        Err(KernelError::NoFreePid)
    })
}

/// Run `f` against the pcb for `pid`, if the slot is occupied.
pub fn with_pcb<R>(pid: ProcessId, f: impl FnOnce(&mut Pcb) -> R) -> Option<R> {
    with_table(|slots| slots.get_mut(pid as usize).and_then(|s| s.as_mut()).map(|p| f(p)))
}

/// Run `f` against two distinct pcbs at once, e.g. to copy state from a
/// parent into a freshly allocated child without taking the table lock
/// twice (which would deadlock, since it isn't reentrant).
pub fn with_two_pcbs<R>(
    pid_a: ProcessId,
    pid_b: ProcessId,
    f: impl FnOnce(&mut Pcb, &mut Pcb) -> R,
) -> Option<R> {
    if pid_a == pid_b {
        return None;
    }
    with_table(|slots| {
        let (lo, hi) = if pid_a < pid_b {
            (pid_a as usize, pid_b as usize)
        } else {
            (pid_b as usize, pid_a as usize)
        };
        let (left, right) = slots.split_at_mut(hi);
        let lo_pcb = left.get_mut(lo)?.as_deref_mut()?;
        let hi_pcb = right.first_mut()?.as_deref_mut()?;
        Some(if pid_a < pid_b {
            f(lo_pcb, hi_pcb)
        } else {
            f(hi_pcb, lo_pcb)
        })
    })
}

/// Mark `pid` a zombie carrying `exit_code`, reparenting any children to
/// init.
pub fn mark_exited(pid: ProcessId, exit_code: i32) {
    with_table(|slots| {
        let children = slots
            .get_mut(pid as usize)
            .and_then(|s| s.as_mut())
            .map(|p| {
                p.state = ProcessState::Zombie;
                p.exit_code = Some(exit_code);
                core::mem::take(&mut p.children)
            })
            .unwrap_or_default();

        for child in children {
            if let Some(Some(child_pcb)) = slots.get_mut(child as usize) {
                child_pcb.parent = Some(INIT_PID);
            }
            if let Some(Some(init_pcb)) = slots.get_mut(INIT_PID as usize) {
                init_pcb.children.push(child);
            }
        }
    });
}

/// Remove a zombie's slot once its parent has collected its exit status.
pub fn reap(pid: ProcessId) {
    with_table(|slots| {
        if let Some(slot) = slots.get_mut(pid as usize) {
            *slot = None;
        }
    });
}

pub fn exit_code(pid: ProcessId) -> Option<i32> {
    with_table(|slots| {
        slots
            .get(pid as usize)
            .and_then(|s| s.as_ref())
            .and_then(|p| p.exit_code)
    })
}

pub fn state(pid: ProcessId) -> Option<ProcessState> {
    with_table(|slots| slots.get(pid as usize).and_then(|s| s.as_ref()).map(|p| p.state))
}

pub fn parent_of(pid: ProcessId) -> Option<ProcessId> {
    with_table(|slots| slots.get(pid as usize).and_then(|s| s.as_ref()).and_then(|p| p.parent))
}

/// Implements [`EvictionSink`] against the live process table so the
/// coremap can tell an evicted page's owner where its data landed
/// without knowing about processes itself.
pub struct ProcessTableSink;

impl EvictionSink for ProcessTableSink {
    fn mark_swapped(&self, owner: Owner, slot: u32) {
        with_pcb(owner.pid, |pcb| {
            pcb.address_space
                .lock()
                .store_pte(owner.vaddr, Pte::swapped(slot));
        });
    }
}
