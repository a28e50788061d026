//! Virtual memory: address spaces, the coremap, swap, the software TLB,
//! and page fault handling.
//!
//! Grounded on the original kernel's `vm.c`/`addrspace.c`. See each
//! submodule's doc comment for which of the original's documented bugs
//! it fixes rather than reproduces.

pub mod addrspace;
pub mod coremap;
pub mod fault;
pub mod pte;
pub mod swap;
pub mod tlb;

pub use addrspace::AddressSpace;
pub use coremap::{Coremap, EvictionSink, FrameState, Owner};
pub use fault::{handle_fault, FaultKind};
pub use pte::Pte;
pub use swap::{SwapFile, SwapSlots};
pub use tlb::SoftTlb;
