//! ELF loading boundary.
//!
//! Stand-in for `load_elf`/`load_segment` in the original kernel. Parsing
//! the ELF header and section table and copying segment bytes into a
//! prepared address space is host/bring-up concern; the address-space
//! bookkeeping (`as_define_region`, `as_prepare_load`, `as_complete_load`)
//! stays entirely in `vm::addrspace`.

use alloc::vec::Vec;

use crate::config::PAGE_SIZE;
use crate::error::KernelResult;
use crate::vm::addrspace::AddressSpace;

/// One loadable segment of a parsed ELF executable.
#[derive(Debug, Clone, Copy)]
pub struct ElfSegment {
    /// Virtual address the segment is mapped at, page-aligned.
    pub vaddr: u32,
    /// Length of the segment in memory, in bytes (may exceed the file
    /// length; the remainder is zero-filled, i.e. `.bss`).
    pub memsz: u32,
    /// Length of the segment's initialized data within the file.
    pub filesz: u32,
    /// Whether the segment is writable once loaded.
    pub writable: bool,
}

impl ElfSegment {
    /// Number of pages this segment spans.
    pub fn npages(&self) -> usize {
        (self.memsz as usize).div_ceil(PAGE_SIZE)
    }
}

/// Parses and loads an ELF executable into a prepared address space.
pub trait ElfLoader {
    /// Open `path`, validate the ELF header, and return its segment table
    /// plus entry point without mapping anything yet.
    fn segments(&self, path: &str) -> KernelResult<(Vec<ElfSegment>, u32)>;

    /// Copy `segment`'s file-backed bytes into `space`, which must already
    /// have the segment's region defined and loading prepared
    /// (`as_prepare_load`).
    fn load_segment(
        &self,
        path: &str,
        segment: &ElfSegment,
        space: &mut AddressSpace,
    ) -> KernelResult<()>;
}
