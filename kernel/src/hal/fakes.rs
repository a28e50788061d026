//! In-memory HAL fakes used by unit and integration tests.
//!
//! None of these talk to real hardware or a real filesystem; they exist so
//! `process::fork`, `process::exec`, and `vm::swap` can be exercised under
//! `cargo test` without a bring-up crate.

extern crate std;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use std::sync::Mutex;

use crate::error::{KernelError, KernelResult};
use crate::vm::addrspace::AddressSpace;

use super::console::ConsoleDevice;
use super::elf::{ElfLoader, ElfSegment};
use super::raw_memory::RawMemory;
use super::trapframe::{Trapframe, UserModeEntry};
use super::vfs::{BlockFile, Vfs};

/// Console fake that records every byte written and replays a scripted
/// sequence of input bytes.
#[derive(Default)]
pub struct FakeConsole {
    input: Mutex<Vec<u8>>,
    output: Mutex<Vec<u8>>,
}

impl FakeConsole {
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: Mutex::new(bytes.iter().rev().copied().collect()),
            output: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.output.lock().unwrap().clone()
    }
}

impl ConsoleDevice for FakeConsole {
    fn getch(&self) -> u8 {
        self.input.lock().unwrap().pop().unwrap_or(0)
    }

    fn putch(&self, byte: u8) {
        self.output.lock().unwrap().push(byte);
    }
}

/// In-memory block file backed by a growable byte vector, standing in for
/// both the swap file and an opened program image.
pub struct FakeBlockFile {
    bytes: Mutex<Vec<u8>>,
}

impl FakeBlockFile {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(bytes),
        }
    }
}

impl BlockFile for FakeBlockFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> KernelResult<usize> {
        let data = self.bytes.lock().unwrap();
        let offset = offset as usize;
        let end = offset.checked_add(buf.len()).ok_or(KernelError::BadAddress)?;
        if end > data.len() {
            return Err(KernelError::BadAddress);
        }
        buf.copy_from_slice(&data[offset..end]);
        Ok(buf.len())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> KernelResult<usize> {
        let mut data = self.bytes.lock().unwrap();
        let offset = offset as usize;
        let end = offset.checked_add(buf.len()).ok_or(KernelError::BadAddress)?;
        if end > data.len() {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(buf);
        Ok(buf.len())
    }
}

/// Namespace fake: a flat map from name to file contents, with files
/// created on first `open(.., create: true, ..)`.
#[derive(Default)]
pub struct FakeVfs {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl FakeVfs {
    pub fn seed(&self, name: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(String::from(name), bytes);
    }
}

impl Vfs for FakeVfs {
    type File = FakeBlockFile;

    fn open(&self, name: &str, create: bool, truncate: bool) -> KernelResult<Self::File> {
        let mut files = self.files.lock().unwrap();
        let bytes = if truncate {
            files.insert(String::from(name), Vec::new());
            Vec::new()
        } else if let Some(existing) = files.get(name) {
            existing.clone()
        } else if create {
            files.insert(String::from(name), Vec::new());
            Vec::new()
        } else {
            return Err(KernelError::NotFound);
        };
        Ok(FakeBlockFile::from_bytes(bytes))
    }
}

/// Raw physical memory fake: a fixed-size arena handed out bump-allocator
/// style, mirroring `ram_stealmem`'s one-way watermark.
pub struct FakeRawMemory {
    size: u64,
    watermark: RefCell<u32>,
}

impl FakeRawMemory {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            watermark: RefCell::new(0),
        }
    }
}

// SAFETY: tests are single-threaded with respect to any one FakeRawMemory;
// the RefCell is never borrowed across an actual concurrent access.
unsafe impl Sync for FakeRawMemory {}

impl RawMemory for FakeRawMemory {
    fn ram_size(&self) -> u64 {
        self.size
    }

    fn steal_pages(&self, npages: usize) -> u32 {
        let mut watermark = self.watermark.borrow_mut();
        let addr = *watermark;
        *watermark += (npages * crate::config::PAGE_SIZE) as u32;
        addr
    }
}

/// ELF loader fake driven by a preset segment table; `load_segment` just
/// zero-fills the region, since no fake tests depend on actual byte
/// contents surviving the load.
#[derive(Default)]
pub struct FakeElfLoader {
    programs: Mutex<BTreeMap<String, (Vec<ElfSegment>, u32)>>,
}

impl FakeElfLoader {
    pub fn register(&self, path: &str, segments: Vec<ElfSegment>, entry: u32) {
        self.programs
            .lock()
            .unwrap()
            .insert(String::from(path), (segments, entry));
    }
}

impl ElfLoader for FakeElfLoader {
    fn segments(&self, path: &str) -> KernelResult<(Vec<ElfSegment>, u32)> {
        self.programs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(KernelError::NotFound)
    }

    fn load_segment(
        &self,
        _path: &str,
        _segment: &ElfSegment,
        _space: &mut AddressSpace,
    ) -> KernelResult<()> {
        Ok(())
    }
}

/// User-mode entry fake: records the last frame it was handed instead of
/// actually switching privilege levels.
#[derive(Default)]
pub struct FakeUserModeEntry {
    last: Mutex<Option<Trapframe>>,
}

impl FakeUserModeEntry {
    pub fn last_frame(&self) -> Option<Trapframe> {
        *self.last.lock().unwrap()
    }
}

impl UserModeEntry for FakeUserModeEntry {
    fn enter_user_mode(&self, frame: &Trapframe) {
        *self.last.lock().unwrap() = Some(*frame);
    }
}
