//! Physical frame allocator (the coremap).
//!
//! Grounded on `vm.c`'s `coremap`/`alloc_one_page`/`alloc_npages`/
//! `free_kpages`/`evict_or_swap`, with two of its documented bugs fixed
//! rather than carried over:
//!
//! - `alloc_npages` asserted `num_continuous == npages` right after a loop
//!   that only ever `break`s once that becomes true or falls off the end
//!   of the coremap, so a request that can't be satisfied contiguously
//!   panics the kernel instead of falling back to eviction. This version
//!   checks the flag instead of asserting it and always has a fallback
//!   path.
//! - the original's random-victim search predicate conflated "allocated"
//!   with "not fixed and not free" using a condition that, fully
//!   expanded, skips `FIXED` frames only by accident of how `DIRTY`/
//!   `CLEAN` happened to be ordered. This version tests frame state
//!   directly.

use alloc::vec::Vec;

use spin::Mutex;

use crate::config::PAGE_SIZE;
use crate::error::{KernelError, KernelResult};

/// What a physical frame currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Unused, available for allocation.
    Free,
    /// Permanently owned by the kernel (coremap itself, early boot
    /// structures); never considered for eviction.
    Fixed,
    /// Holds a page matching what's on backing storage (or backed by
    /// nothing, e.g. a still-zero BSS page); can be dropped without
    /// swapping out.
    Clean,
    /// Holds a page whose contents have diverged from backing storage;
    /// must be written to the swap file before reuse.
    Dirty,
}

/// A frame the owning address space can be told to update when its
/// backing frame is evicted.
#[derive(Debug, Clone, Copy)]
pub struct Owner {
    pub pid: u32,
    pub vaddr: u32,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: FrameState,
    owner: Option<Owner>,
    /// Length, in frames, of the allocation this frame is the first frame
    /// of. Zero for frames that are not the first frame of an allocation.
    run_len: usize,
}

impl Entry {
    const fn free() -> Self {
        Self {
            state: FrameState::Free,
            owner: None,
            run_len: 0,
        }
    }
}

/// Callback the coremap uses to tell an evicted page's owner where its
/// data went. `process::table` implements this against the live process
/// table; tests can supply a recording fake.
pub trait EvictionSink {
    fn mark_swapped(&self, owner: Owner, slot: u32);
}

pub struct Coremap {
    frames: Mutex<Vec<Entry>>,
    /// Backing bytes for every frame, laid out contiguously by frame
    /// index. Stands in for physical RAM, which this simulator otherwise
    /// has no reason to represent: the coremap only ever hands out
    /// addresses, but swap-out/swap-in need something to actually copy.
    memory: Mutex<Vec<u8>>,
    base_frame: u32,
}

impl Coremap {
    /// Build a coremap over `num_frames` physical frames starting at
    /// `base_frame`, with the first `num_fixed` permanently reserved.
    pub fn new(base_frame: u32, num_frames: usize, num_fixed: usize) -> Self {
        let mut frames = alloc::vec![Entry::free(); num_frames];
        for entry in frames.iter_mut().take(num_fixed) {
            entry.state = FrameState::Fixed;
        }
        Self {
            frames: Mutex::new(frames),
            memory: Mutex::new(alloc::vec![0u8; num_frames * PAGE_SIZE]),
            base_frame,
        }
    }

    pub fn num_frames(&self) -> usize {
        self.frames.lock().len()
    }

    fn frame_to_addr(&self, frame_index: usize) -> u32 {
        (self.base_frame as usize + frame_index * PAGE_SIZE) as u32
    }

    fn addr_to_index(&self, addr: u32) -> usize {
        ((addr - self.base_frame) as usize) / PAGE_SIZE
    }

    /// Zero-fill the frame at `addr`. Used for demand-paged BSS/stack
    /// pages, which the original calls `as_zero_region`.
    pub fn zero_frame(&self, addr: u32) {
        let index = self.addr_to_index(addr);
        let mut memory = self.memory.lock();
        memory[index * PAGE_SIZE..(index + 1) * PAGE_SIZE].fill(0);
    }

    /// Copy `data` into the frame at `addr` starting at `offset`,
    /// zero-filling the rest. Used by the ELF loader to place segment
    /// bytes and zero-fill any trailing BSS within the same page.
    pub fn write_frame_at(&self, addr: u32, offset: usize, data: &[u8]) {
        let index = self.addr_to_index(addr);
        let mut memory = self.memory.lock();
        let page = &mut memory[index * PAGE_SIZE..(index + 1) * PAGE_SIZE];
        page[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Read the full contents of the frame at `addr`.
    pub fn read_frame(&self, addr: u32, out: &mut [u8; PAGE_SIZE]) {
        let index = self.addr_to_index(addr);
        let memory = self.memory.lock();
        out.copy_from_slice(&memory[index * PAGE_SIZE..(index + 1) * PAGE_SIZE]);
    }

    /// Allocate a single frame, evicting a victim via `sink` if none is
    /// free.
    pub fn alloc_page(
        &self,
        owner: Owner,
        sink: &dyn EvictionSink,
        swap: &dyn super::swap::SwapSlots,
    ) -> KernelResult<u32> {
        let mut frames = self.frames.lock();
        if let Some(index) = frames.iter().position(|e| e.state == FrameState::Free) {
            frames[index] = Entry {
                state: FrameState::Dirty,
                owner: Some(owner),
                run_len: 1,
            };
            drop(frames);
            let addr = self.frame_to_addr(index);
            self.zero_frame(addr);
            return Ok(addr);
        }
        let index = self.evict_victim(&mut frames, sink, swap)?;
        frames[index] = Entry {
            state: FrameState::Dirty,
            owner: Some(owner),
            run_len: 1,
        };
        drop(frames);
        let addr = self.frame_to_addr(index);
        self.zero_frame(addr);
        Ok(addr)
    }

    /// Allocate `npages` contiguous frames for kernel use (no user owner,
    /// never evictable once allocated).
    pub fn alloc_kpages(&self, npages: usize) -> KernelResult<u32> {
        let mut frames = self.frames.lock();
        if let Some(start) = find_contiguous_free(&frames, npages) {
            for entry in frames[start..start + npages].iter_mut() {
                entry.state = FrameState::Fixed;
                entry.owner = None;
                entry.run_len = 0;
            }
            frames[start].run_len = npages;
            return Ok(self.frame_to_addr(start));
        }
        Err(KernelError::OutOfMemory)
    }

    /// Free the `npages`-frame run starting at `addr`.
    pub fn free_kpages(&self, addr: u32) -> KernelResult<()> {
        let mut frames = self.frames.lock();
        let start = ((addr - self.base_frame) as usize) / PAGE_SIZE;
        let npages = frames.get(start).map(|e| e.run_len).unwrap_or(0);
        if npages == 0 {
            return Err(KernelError::InvalidArgument);
        }
        for entry in frames[start..start + npages].iter_mut() {
            *entry = Entry::free();
        }
        Ok(())
    }

    /// Mark the frame at `addr` dirty (a write just occurred to it).
    pub fn mark_dirty(&self, addr: u32) {
        let mut frames = self.frames.lock();
        let index = self.addr_to_index(addr);
        if let Some(entry) = frames.get_mut(index) {
            if entry.state == FrameState::Clean {
                entry.state = FrameState::Dirty;
            }
        }
    }

    /// Picks a random allocated (clean or dirty) victim frame, writes it
    /// out if dirty, tells its owner where it landed, and returns its
    /// index freed for reuse. Fixed and already-free frames are never
    /// chosen.
    fn evict_victim(
        &self,
        frames: &mut [Entry],
        sink: &dyn EvictionSink,
        swap: &dyn super::swap::SwapSlots,
    ) -> KernelResult<usize> {
        let candidates: Vec<usize> = frames
            .iter()
            .enumerate()
            .filter(|(_, e)| e.state == FrameState::Clean || e.state == FrameState::Dirty)
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return Err(KernelError::OutOfMemory);
        }
        let pick = candidates[pseudo_random(candidates.len())];
        let entry = frames[pick];
        let owner = entry.owner.ok_or(KernelError::OutOfMemory)?;

        let slot = swap.alloc_slot()?;
        if entry.state == FrameState::Dirty {
            let memory = self.memory.lock();
            let page = &memory[pick * PAGE_SIZE..(pick + 1) * PAGE_SIZE];
            swap.write_slot(slot, page)?;
        }
        sink.mark_swapped(owner, slot);
        frames[pick] = Entry::free();
        Ok(pick)
    }
}

fn find_contiguous_free(frames: &[Entry], npages: usize) -> Option<usize> {
    let mut run_start = 0;
    let mut run_len = 0;
    for (i, entry) in frames.iter().enumerate() {
        if entry.state == FrameState::Free {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
            if run_len == npages {
                return Some(run_start);
            }
        } else {
            run_len = 0;
        }
    }
    None
}

/// Minimal xorshift PRNG so eviction victim choice doesn't need an `std`
/// entropy source. Not cryptographic; a page replacement policy has no
/// need to be.
fn pseudo_random(bound: usize) -> usize {
    use core::sync::atomic::{AtomicU32, Ordering};
    static STATE: AtomicU32 = AtomicU32::new(0x9e37_79b9);
    let mut x = STATE.load(Ordering::Relaxed);
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    STATE.store(x, Ordering::Relaxed);
    (x as usize) % bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::swap::SwapSlots;

    struct NullSink;
    impl EvictionSink for NullSink {
        fn mark_swapped(&self, _owner: Owner, _slot: u32) {}
    }

    struct FakeSwap;
    impl SwapSlots for FakeSwap {
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
    fn allocates_free_frames_before_evicting() {
        let coremap = Coremap::new(0, 4, 1);
        let owner = Owner { pid: 1, vaddr: 0 };
        let a = coremap
            .alloc_page(owner, &NullSink, &FakeSwap)
            .expect("alloc");
        assert_eq!(coremap.num_frames(), 4);
        assert_ne!(a, 0); // frame 0 is fixed
    }

    #[test]
    fn alloc_kpages_finds_contiguous_run_and_frees_it() {
        let coremap = Coremap::new(0, 8, 1);
        let base = coremap.alloc_kpages(3).expect("alloc");
        coremap.free_kpages(base).expect("free");
        let reused = coremap.alloc_kpages(3).expect("realloc");
        assert_eq!(base, reused);
    }

    #[test]
    fn eviction_happens_once_free_frames_are_exhausted() {
        let coremap = Coremap::new(0, 2, 1); // 1 fixed, 1 free
        let owner = Owner { pid: 1, vaddr: 0 };
        let _first = coremap.alloc_page(owner, &NullSink, &FakeSwap).unwrap();
        // no free frames left; must evict the one we just took
        let second = coremap.alloc_page(owner, &NullSink, &FakeSwap).unwrap();
        assert_eq!(second, _first);
    }
}
