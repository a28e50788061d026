//! `fork`: duplicate the calling process into a freshly allocated child.
//!
//! Grounded on `as_copy`'s region-by-region duplication of the parent's
//! address space. Copy-on-write is a non-goal here just as it was left
//! out of the original: every present or swapped-out page is copied
//! eagerly into a frame of its own for the child.

use alloc::string::String;

use crate::config::PAGE_SIZE;
use crate::error::{KernelError, KernelResult};
use crate::hal::trapframe::Trapframe;
use crate::vm::{Coremap, EvictionSink, Owner, Pte, SwapSlots};

use super::table;

/// Create a child of `parent_pid`, copying its address space page for
/// page, and return the child's pid along with the trapframe the child
/// should resume in (a copy of `parent_frame` patched to return `0`, the
/// fork-child half of the classic split return value).
pub fn fork_process(
    parent_pid: u32,
    parent_frame: &Trapframe,
    coremap: &Coremap,
    sink: &dyn EvictionSink,
    swap: &dyn SwapSlots,
) -> KernelResult<(u32, Trapframe)> {
    let name = table::with_pcb(parent_pid, |pcb| pcb.name.clone())
        .ok_or(KernelError::InvalidArgument)?;
    let child_pid = table::alloc(Some(parent_pid), name)?;

    let copy_result = table::with_two_pcbs(parent_pid, child_pid, |parent, child| {
        let parent_space = parent.address_space.lock();
        let mut child_space = child.address_space.lock();
        let child_pid = child.pid;

        for region in parent_space.regions().to_vec() {
            child_space.define_region(region.vbase, (region.npages * PAGE_SIZE) as u32, region.writable)?;

            for page in 0..region.npages {
                let vaddr = region.vbase + (page * PAGE_SIZE) as u32;
                let pte = parent_space.lookup_pte(vaddr).unwrap_or(Pte::EMPTY);
                if !pte.is_present() && !pte.is_swapped() {
                    continue;
                }

                let mut buf = [0u8; PAGE_SIZE];
                if pte.is_present() {
                    coremap.read_frame(pte.frame() * PAGE_SIZE as u32, &mut buf);
                } else {
                    swap.read_slot(pte.swap_slot(), &mut buf)?;
                }

                let child_owner = Owner {
                    pid: child_pid,
                    vaddr,
                };
                let child_addr = coremap.alloc_page(child_owner, sink, swap)?;
                coremap.write_frame_at(child_addr, 0, &buf);
                child_space.store_pte(vaddr, Pte::present(child_addr / PAGE_SIZE as u32));
            }
        }
        Ok(())
    });

    match copy_result {
        Some(Ok(())) => {
            let mut child_frame = *parent_frame;
            child_frame.set_success(0);
            Ok((child_pid, child_frame))
        }
        Some(Err(e)) => {
            table::reap(child_pid);
            Err(e)
        }
        None => {
            table::reap(child_pid);
            Err(KernelError::InvalidArgument)
        }
    }
}
