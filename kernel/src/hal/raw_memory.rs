//! Bootstrap-time physical memory boundary.
//!
//! Stand-in for `ram_stealmem`/`ram_getsize`. Only used before the coremap
//! exists, to hand out the handful of frames the coremap itself and other
//! early kernel structures need. Nothing after `vm::coremap::bootstrap`
//! calls into this again.

/// Raw physical memory, as reported by the platform before the coremap is
/// built.
pub trait RawMemory {
    /// Total usable physical memory, in bytes.
    fn ram_size(&self) -> u64;

    /// Hand out `npages` contiguous frames from the low end of memory not
    /// yet claimed by the kernel image, advancing the watermark. Returns
    /// the physical address of the first frame.
    ///
    /// Only valid before the coremap takes over; once it does, frames are
    /// tracked there instead and this must not be called again.
    fn steal_pages(&self, npages: usize) -> u32;
}
