//! sys161 kernel library.
//!
//! Synchronization primitives, process/thread lifecycle, and virtual
//! memory for a single-CPU, MIPS-simulator teaching kernel, built
//! behind a HAL boundary so the bulk of the kernel can be exercised
//! under `cargo test` on the host instead of only in the simulator.

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Bare-metal target: a real heap carved out of the memory the HAL's
// `RawMemory` impl reports, same as the teacher crate's x86_64 leg.
// No `mipsel-sys161-none` target exists in the stable toolchain today,
// so this path is aspirational; see DESIGN.md.
#[cfg(all(target_os = "none", feature = "bare-metal"))]
use linked_list_allocator::LockedHeap;

#[cfg(all(target_os = "none", feature = "bare-metal"))]
#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Host target: delegate to the system allocator so unit and
/// integration tests can use `Vec`/`String`/`Box` normally.
#[cfg(not(target_os = "none"))]
extern crate std;
#[cfg(not(target_os = "none"))]
#[global_allocator]
static SYSTEM_ALLOCATOR: std::alloc::System = std::alloc::System;

#[macro_use]
pub mod print;

pub mod config;
pub mod error;
pub mod hal;
pub mod klog;
pub mod process;
pub mod sched;
pub mod sync;
pub mod syscall;
pub mod vm;

/// Heap allocation error handler. Allocation failure in a `no_std`
/// kernel is unrecoverable; the ABI requires `-> !`.
#[cfg(all(target_os = "none", feature = "bare-metal"))]
#[alloc_error_handler]
fn alloc_error_handler(layout: core::alloc::Layout) -> ! {
    panic!("allocation error: {:?}", layout);
}

#[cfg(all(target_os = "none", feature = "bare-metal"))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    // Bypass the logger entirely: a panic mid-log would reenter it.
    kprintln!("PANIC: {}", info);
    loop {
        core::hint::spin_loop();
    }
}
