//! Bare-metal entry point.
//!
//! Thin by design: everything of substance lives in the library crate
//! so it can be exercised under `cargo test` on the host. This binary
//! only builds at all against the `bare-metal` feature and a real
//! MIPS/sys161 target, which the stable toolchain doesn't ship today;
//! see DESIGN.md.

#![cfg_attr(feature = "bare-metal", no_std)]
#![cfg_attr(feature = "bare-metal", no_main)]

#[cfg(feature = "bare-metal")]
use kernel::process;

/// Kernel entry point reached once the bootloader has handed off.
#[cfg(feature = "bare-metal")]
#[no_mangle]
pub extern "C" fn _start() -> ! {
    process::spawn_init().expect("init process must be creatable at boot");
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(not(feature = "bare-metal"))]
fn main() {
    println!("the kernel binary only builds for the bare-metal target; exercise the library crate's tests instead");
}
