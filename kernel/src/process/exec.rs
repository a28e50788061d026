//! `execv`: replace the calling process's program image in place,
//! keeping its pid.
//!
//! Grounded on `runprogram`/`runprogram_exev`: open the executable,
//! build a fresh address space, load each segment, define the stack,
//! and copy `argv` onto it before handing control to the entry point.
//! The old image's frames are simply abandoned rather than freed; a
//! real allocator would want a way to enumerate and release a process's
//! pages on its own, which the coremap doesn't expose today.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::PAGE_SIZE;
use crate::error::{KernelError, KernelResult};
use crate::hal::elf::ElfLoader;
use crate::hal::trapframe::Trapframe;
use crate::hal::vfs::Vfs;
use crate::vm::{handle_fault, AddressSpace, Coremap, EvictionSink, FaultKind, SoftTlb, SwapSlots};

use super::table;

/// Copy `bytes` onto the stack below `sp`, faulting pages in as needed,
/// and return the address the bytes now start at.
#[allow(clippy::too_many_arguments)]
fn push_bytes(
    pid: u32,
    space: &mut AddressSpace,
    tlb: &mut SoftTlb,
    coremap: &Coremap,
    swap: &dyn SwapSlots,
    sink: &dyn EvictionSink,
    sp: u32,
    bytes: &[u8],
) -> KernelResult<u32> {
    let new_sp = sp - bytes.len() as u32;
    let mut written = 0usize;
    while written < bytes.len() {
        let addr = new_sp + written as u32;
        let page = addr & !((PAGE_SIZE - 1) as u32);
        let offset = (addr - page) as usize;
        let chunk = core::cmp::min(PAGE_SIZE - offset, bytes.len() - written);

        handle_fault(pid, space, tlb, coremap, swap, sink, addr, FaultKind::Write)?;
        let pte = space.lookup_pte(page).ok_or(KernelError::BadAddress)?;
        let frame_addr = pte.frame() * PAGE_SIZE as u32;
        coremap.write_frame_at(frame_addr, offset, &bytes[written..written + chunk]);
        coremap.mark_dirty(frame_addr);
        written += chunk;
    }
    Ok(new_sp)
}

/// Replace `pid`'s address space with a freshly loaded `path`, passing
/// `argv` on the new stack. Returns the trapframe execution should
/// resume in: `a0`/`a1` hold `argc`/`argv` and `epc` the entry point.
#[allow(clippy::too_many_arguments)]
pub fn exec_process(
    pid: u32,
    path: &str,
    argv: &[String],
    loader: &dyn ElfLoader,
    coremap: &Coremap,
    sink: &dyn EvictionSink,
    swap: &dyn SwapSlots,
) -> KernelResult<Trapframe> {
    let (segments, entry) = loader.segments(path)?;

    let mut space = AddressSpace::new();
    let mut tlb = SoftTlb::new();

    space.prepare_load();
    for segment in &segments {
        space.define_region(segment.vaddr, segment.memsz, segment.writable)?;
        loader.load_segment(path, segment, &mut space)?;
    }
    space.complete_load();

    let mut sp = space.define_stack();

    let mut arg_ptrs = Vec::with_capacity(argv.len());
    for arg in argv.iter().rev() {
        let mut bytes: Vec<u8> = arg.as_bytes().to_vec();
        bytes.push(0);
        sp = push_bytes(pid, &mut space, &mut tlb, coremap, swap, sink, sp, &bytes)?;
        arg_ptrs.push(sp);
    }
    arg_ptrs.reverse();

    sp &= !0x7;

    let mut pointer_bytes = Vec::with_capacity((arg_ptrs.len() + 1) * 4);
    for ptr in &arg_ptrs {
        pointer_bytes.extend_from_slice(&ptr.to_le_bytes());
    }
    pointer_bytes.extend_from_slice(&0u32.to_le_bytes());
    sp = push_bytes(pid, &mut space, &mut tlb, coremap, swap, sink, sp, &pointer_bytes)?;
    let argv_ptr = sp;

    table::with_pcb(pid, |pcb| {
        *pcb.address_space.lock() = space;
    })
    .ok_or(KernelError::InvalidArgument)?;

    let mut frame = Trapframe::default();
    frame.a0 = argv.len() as u32;
    frame.a1 = argv_ptr;
    frame.epc = entry;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::elf::ElfSegment;
    use crate::vm::coremap::Owner as CoremapOwner;

    extern crate std;
    static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    struct NullSink;
    impl EvictionSink for NullSink {
        fn mark_swapped(&self, _owner: CoremapOwner, _slot: u32) {}
    }

    struct NullSwap;
    impl SwapSlots for NullSwap {
        fn alloc_slot(&self) -> KernelResult<u32> {
            Ok(0)
        }
        fn write_slot(&self, _slot: u32, _data: &[u8]) -> KernelResult<()> {
            Ok(())
        }
        fn read_slot(&self, _slot: u32, _data: &mut [u8]) -> KernelResult<()> {
            Ok(())
        }
        fn free_slot(&self, _slot: u32) {}
    }

    struct FakeLoader;
    impl ElfLoader for FakeLoader {
        fn segments(&self, _path: &str) -> KernelResult<(Vec<ElfSegment>, u32)> {
            Ok((
                alloc::vec![ElfSegment {
                    vaddr: 0x0040_0000,
                    memsz: PAGE_SIZE as u32,
                    filesz: 4,
                    writable: false,
                }],
                0x0040_0000,
            ))
        }

        fn load_segment(
            &self,
            _path: &str,
            _segment: &ElfSegment,
            _space: &mut AddressSpace,
        ) -> KernelResult<()> {
            Ok(())
        }
    }

    #[test]
    fn execs_process_and_lays_argv_on_the_stack() {
        let _guard = TEST_LOCK.lock().unwrap();
        let coremap = Coremap::new(0, 64, 1);
        let pid = table::alloc(None, String::from("init")).unwrap();

        let argv = alloc::vec![String::from("prog"), String::from("arg1")];
        let frame = exec_process(pid, "prog", &argv, &FakeLoader, &coremap, &NullSink, &NullSwap)
            .expect("exec succeeds");

        assert_eq!(frame.epc, 0x0040_0000);
        assert_eq!(frame.a0, 2);
        assert!(frame.a1 > 0);

        table::with_pcb(pid, |pcb| {
            let space = pcb.address_space.lock();
            assert!(space.region_for(0x0040_0000).is_some());
        })
        .unwrap();

        table::reap(pid);
    }
}
