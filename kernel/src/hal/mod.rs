//! Hardware abstraction boundary.
//!
//! Everything the purpose statement calls "external" — bootstrap assembly,
//! the VFS/block layer, the ELF loader, and the user-mode trampoline — is
//! expressed here as a trait or free function signature instead of being
//! implemented. A bring-up crate outside this one supplies the real bodies;
//! tests supply [`fakes`] instead.
//!
//! Generalizes the usual architecture-independent-kernel-logic-versus-
//! per-target-glue split into a trait boundary, since no single concrete
//! target (x86_64, aarch64, riscv64) matches a MIPS simulator.

pub mod console;
pub mod elf;
pub mod raw_memory;
pub mod trapframe;
pub mod vfs;

#[cfg(any(test, feature = "testing"))]
pub mod fakes;

pub use console::ConsoleDevice;
pub use elf::ElfLoader;
pub use raw_memory::RawMemory;
pub use trapframe::{Trapframe, UserModeEntry};
pub use vfs::{BlockFile, Vfs};
