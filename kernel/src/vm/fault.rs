//! Page fault handling.
//!
//! Grounded on `vm_fault`/`handle_vaddr_fault`: classify the fault,
//! confirm the address falls inside a defined region (or the stack),
//! resolve a frame for it — already present, swapped out and needing a
//! read back in, or never faulted in and needing a fresh zeroed frame —
//! and load the translation into the software TLB.

use crate::config::PAGE_SIZE;
use crate::error::{KernelError, KernelResult};

use super::addrspace::AddressSpace;
use super::coremap::{Coremap, EvictionSink, Owner};
use super::pte::Pte;
use super::swap::SwapSlots;
use super::tlb::SoftTlb;

/// Why the TLB trapped. `ReadOnly` is the MIPS `VM_FAULT_READONLY`: the
/// hardware TLB entry was marked read-only and a store was attempted
/// against it; it is never resolvable by mapping more memory and always
/// propagates as an error to the caller, which terminates the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Read,
    Write,
    ReadOnly,
}

fn page_base(vaddr: u32) -> u32 {
    vaddr & !((PAGE_SIZE - 1) as u32)
}

/// Resolve a TLB miss or protection fault at `fault_addr` for `pid`'s
/// address space, installing the resulting translation into `tlb`.
#[allow(clippy::too_many_arguments)]
pub fn handle_fault(
    pid: u32,
    space: &mut AddressSpace,
    tlb: &mut SoftTlb,
    coremap: &Coremap,
    swap: &dyn SwapSlots,
    sink: &dyn EvictionSink,
    fault_addr: u32,
    kind: FaultKind,
) -> KernelResult<()> {
    if kind == FaultKind::ReadOnly {
        return Err(KernelError::BadAddress);
    }

    let page_vaddr = page_base(fault_addr);
    let region = space.region_for(fault_addr).ok_or(KernelError::BadAddress)?;
    let writable = region.writable;
    if kind == FaultKind::Write && !writable {
        return Err(KernelError::BadAddress);
    }

    let pte = space.lookup_pte(page_vaddr).unwrap_or(Pte::EMPTY);

    let frame_number = if pte.is_present() {
        pte.frame()
    } else if pte.is_swapped() {
        let slot = pte.swap_slot();
        let owner = Owner {
            pid,
            vaddr: page_vaddr,
        };
        let addr = coremap.alloc_page(owner, sink, swap)?;
        let mut buf = [0u8; PAGE_SIZE];
        swap.read_slot(slot, &mut buf)?;
        coremap.write_frame_at(addr, 0, &buf);
        swap.free_slot(slot);
        let frame_number = addr / PAGE_SIZE as u32;
        space.store_pte(page_vaddr, Pte::present(frame_number));
        frame_number
    } else {
        let owner = Owner {
            pid,
            vaddr: page_vaddr,
        };
        let addr = coremap.alloc_page(owner, sink, swap)?;
        let frame_number = addr / PAGE_SIZE as u32;
        space.store_pte(page_vaddr, Pte::present(frame_number));
        frame_number
    };

    if kind == FaultKind::Write {
        coremap.mark_dirty(frame_number * PAGE_SIZE as u32);
    }

    tlb.insert(page_vaddr >> 12, frame_number, writable);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::coremap::Owner as CoremapOwner;

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

    #[test]
    fn first_touch_allocates_a_zeroed_frame_and_fills_tlb() {
        let mut space = AddressSpace::new();
        space
            .define_region(0x0040_0000, PAGE_SIZE as u32, true)
            .unwrap();
        let coremap = Coremap::new(0, 8, 1);
        let mut tlb = SoftTlb::new();

        handle_fault(
            1,
            &mut space,
            &mut tlb,
            &coremap,
            &NullSwap,
            &NullSink,
            0x0040_0010,
            FaultKind::Read,
        )
        .expect("fault resolves");

        assert!(space.lookup_pte(0x0040_0000).unwrap().is_present());
        assert!(tlb.lookup(0x0040_0000 >> 12).is_some());
    }

    #[test]
    fn write_to_readonly_region_is_rejected() {
        let mut space = AddressSpace::new();
        space
            .define_region(0x0040_0000, PAGE_SIZE as u32, false)
            .unwrap();
        let coremap = Coremap::new(0, 8, 1);
        let mut tlb = SoftTlb::new();

        let result = handle_fault(
            1,
            &mut space,
            &mut tlb,
            &coremap,
            &NullSwap,
            &NullSink,
            0x0040_0010,
            FaultKind::Write,
        );
        assert_eq!(result, Err(KernelError::BadAddress));
    }

    #[test]
    fn unmapped_address_is_rejected() {
        let mut space = AddressSpace::new();
        let coremap = Coremap::new(0, 8, 1);
        let mut tlb = SoftTlb::new();

        let result = handle_fault(
            1,
            &mut space,
            &mut tlb,
            &coremap,
            &NullSwap,
            &NullSink,
            0x0090_0000,
            FaultKind::Read,
        );
        assert_eq!(result, Err(KernelError::BadAddress));
    }
}
