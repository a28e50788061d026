//! Kernel-wide tunables.
//!
//! Centralizes the magic numbers that would otherwise be scattered through
//! the process, vm, and sync layers.

/// Size of a physical frame / virtual page, in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Number of entries in a first- or second-level page table.
pub const PAGE_TABLE_ENTRIES: usize = 1024;

/// Top of user address space; the stack occupies the `STACK_PAGES` pages
/// immediately below it.
pub const USERSTACK: u32 = 0x8000_0000;

/// Number of pages reserved for the user stack.
pub const STACK_PAGES: usize = 24;

/// Bottom of the user stack region (`USERSTACK - STACK_PAGES * PAGE_SIZE`).
pub const STACK_BASE: u32 = USERSTACK - (STACK_PAGES * PAGE_SIZE) as u32;

/// Size of the fixed-capacity process table. Slot 0 is never used; slot 1
/// is init.
pub const MAX_PID: usize = 1024;

/// Smallest valid process id (slot 0 is reserved, never allocated).
pub const MIN_PID: u32 = 1;

/// PID of the init process; parentless zombies are reparented here.
pub const INIT_PID: u32 = 1;

/// Capacity of the swap bitmap, i.e. the maximum number of swapped-out
/// pages the swap file can hold at once.
pub const MAX_SWAPFILE_SLOTS: usize = 65536;

/// Bound on a kernel-copied `execv` path, in bytes including the NUL.
pub const MAX_PATH_LEN: usize = 1024;

/// Bound on a single kernel-copied `execv` argument, in bytes including the
/// NUL.
pub const MAX_ARG_LEN: usize = 1024;

/// Bound on the number of `execv` arguments.
pub const MAX_ARGC: usize = 64;

/// Number of entries modeled in the software-refilled TLB.
pub const NUM_TLB_ENTRIES: usize = 64;

/// Fixed base address of a process's heap region, grown by `sbrk`. Chosen
/// well clear of the typical text/data load address and far below the
/// stack, since this kernel has no dynamic linker to consult for where a
/// program's image actually ends.
pub const HEAP_BASE: u32 = 0x1000_0000;

/// Upper bound on how far `sbrk` can grow a process's heap. The region
/// is reserved at this full size the first time `sbrk` is called rather
/// than resized incrementally, since `AddressSpace` has no operation for
/// growing a region already in its list.
pub const HEAP_MAX_SIZE: u32 = 16 * 1024 * 1024;
