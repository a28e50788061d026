//! Swap file.
//!
//! Grounded on `swapping_init`/`swap_out`/`load_page`: a bitmap of free
//! slots over a single backing file, one `PAGE_SIZE` slot per bit. The
//! actual file I/O goes through [`crate::hal::Vfs`]; this module only
//! owns the slot bitmap and the read/write framing around it.

use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;

use crate::config::{MAX_SWAPFILE_SLOTS, PAGE_SIZE};
use crate::error::{KernelError, KernelResult};
use crate::hal::{BlockFile, Vfs};

/// Slot allocation and the read/write operations the coremap needs to
/// move a frame's contents to and from disk, expressed as a trait so the
/// coremap doesn't need to know [`SwapFile`]'s `BlockFile` type parameter.
pub trait SwapSlots {
    fn alloc_slot(&self) -> KernelResult<u32>;
    fn write_slot(&self, slot: u32, data: &[u8]) -> KernelResult<()>;
    fn read_slot(&self, slot: u32, data: &mut [u8]) -> KernelResult<()>;
    fn free_slot(&self, slot: u32);
}

/// A bitmap-backed swap file over a [`BlockFile`].
pub struct SwapFile<F: BlockFile> {
    file: F,
    bitmap: Mutex<Vec<bool>>,
}

impl<F: BlockFile> SwapFile<F> {
    pub fn open<V: Vfs<File = F>>(vfs: &V, name: &str) -> KernelResult<Self> {
        let file = vfs.open(name, true, false)?;
        Ok(Self {
            file,
            bitmap: Mutex::new(vec![false; MAX_SWAPFILE_SLOTS]),
        })
    }
}

impl<F: BlockFile> SwapSlots for SwapFile<F> {
    fn alloc_slot(&self) -> KernelResult<u32> {
        let mut bitmap = self.bitmap.lock();
        let slot = bitmap.iter().position(|used| !used);
        match slot {
            Some(slot) => {
                bitmap[slot] = true;
                Ok(slot as u32)
            }
            None => Err(KernelError::OutOfMemory),
        }
    }

    fn write_slot(&self, slot: u32, data: &[u8]) -> KernelResult<()> {
        self.file.write_at(slot as u64 * PAGE_SIZE as u64, data)?;
        Ok(())
    }

    fn read_slot(&self, slot: u32, data: &mut [u8]) -> KernelResult<()> {
        self.file.read_at(slot as u64 * PAGE_SIZE as u64, data)?;
        Ok(())
    }

    fn free_slot(&self, slot: u32) {
        let mut bitmap = self.bitmap.lock();
        if let Some(used) = bitmap.get_mut(slot as usize) {
            *used = false;
        }
    }
}
