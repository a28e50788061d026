//! Per-process address space.
//!
//! Grounded on `addrspace.c`'s region list plus `as_create`/`as_copy`/
//! `as_define_region`/`as_prepare_load`/`as_complete_load`/
//! `as_define_stack`/`as_activate`. Regions are the executable's segments
//! (text, data, BSS); the stack is tracked separately since it is never
//! named by the ELF program header.

use alloc::vec::Vec;

use crate::config::{PAGE_SIZE, STACK_BASE, USERSTACK};
use crate::error::{KernelError, KernelResult};

use super::pte::{MasterTable, Pte};

/// One mapped region of a process's address space (a loaded ELF segment).
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub vbase: u32,
    pub npages: usize,
    pub writable: bool,
    /// Set aside while the ELF loader writes segment data
    /// (`as_prepare_load` forces writability even for read-only text),
    /// cleared by `complete_load`.
    was_readonly: bool,
}

impl Region {
    fn vtop(&self) -> u32 {
        self.vbase + (self.npages * PAGE_SIZE) as u32
    }

    fn contains(&self, vaddr: u32) -> bool {
        vaddr >= self.vbase && vaddr < self.vtop()
    }
}

/// A process's virtual address space: its defined regions, the user
/// stack, and the two-level page table translating both.
pub struct AddressSpace {
    regions: Vec<Region>,
    pub page_table: MasterTable,
    loading: bool,
}

impl AddressSpace {
    /// `as_create`.
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            page_table: MasterTable::new(),
            loading: false,
        }
    }

    /// `as_define_region`. `vbase` must already be page-aligned;
    /// `memsz` is rounded up to a whole number of pages.
    pub fn define_region(&mut self, vbase: u32, memsz: u32, writable: bool) -> KernelResult<()> {
        if vbase % PAGE_SIZE as u32 != 0 {
            return Err(KernelError::InvalidArgument);
        }
        let npages = (memsz as usize).div_ceil(PAGE_SIZE);
        self.regions.push(Region {
            vbase,
            npages,
            writable,
            was_readonly: !writable,
        });
        Ok(())
    }

    /// `as_prepare_load`: force every region temporarily writable so the
    /// ELF loader can copy segment bytes in, even into `.text`.
    pub fn prepare_load(&mut self) {
        self.loading = true;
        for region in &mut self.regions {
            region.was_readonly = !region.writable;
            region.writable = true;
        }
    }

    /// `as_complete_load`: restore each region's declared permissions.
    pub fn complete_load(&mut self) {
        self.loading = false;
        for region in &mut self.regions {
            region.writable = !region.was_readonly;
        }
    }

    /// `as_define_stack`: the stack occupies the fixed
    /// `[STACK_BASE, USERSTACK)` range below the top of the address
    /// space; returns the initial stack pointer.
    pub fn define_stack(&mut self) -> u32 {
        let npages = (USERSTACK - STACK_BASE) as usize / PAGE_SIZE;
        self.regions.push(Region {
            vbase: STACK_BASE,
            npages,
            writable: true,
            was_readonly: false,
        });
        USERSTACK
    }

    /// The region containing `vaddr`, if any, and whether a write to it
    /// is permitted.
    pub fn region_for(&self, vaddr: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(vaddr))
    }

    pub fn lookup_pte(&self, vaddr: u32) -> Option<Pte> {
        self.page_table.lookup(vaddr & !((PAGE_SIZE - 1) as u32))
    }

    pub fn store_pte(&mut self, vaddr: u32, pte: Pte) {
        self.page_table.store(vaddr & !((PAGE_SIZE - 1) as u32), pte);
    }

    /// `as_copy`: a full copy of every region and page table entry.
    /// Copy-on-write is a non-goal; every mapped page is duplicated
    /// eagerly by the caller (`process::fork`), which owns the frame
    /// allocation this method doesn't perform itself.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_and_complete_load_round_trip_permissions() {
        let mut space = AddressSpace::new();
        space.define_region(0x0040_0000, PAGE_SIZE as u32, false).unwrap();
        assert!(!space.regions()[0].writable);
        space.prepare_load();
        assert!(space.regions()[0].writable);
        space.complete_load();
        assert!(!space.regions()[0].writable);
    }

    #[test]
    fn define_stack_spans_expected_range() {
        let mut space = AddressSpace::new();
        let sp = space.define_stack();
        assert_eq!(sp, USERSTACK);
        assert!(space.region_for(USERSTACK - 4).is_some());
    }

    #[test]
    fn rejects_misaligned_region_base() {
        let mut space = AddressSpace::new();
        assert!(space.define_region(1, PAGE_SIZE as u32, true).is_err());
    }
}
