//! Software-managed TLB model.
//!
//! The original fault handler, once it has a resolved physical frame,
//! probes the hardware TLB for a free slot and falls back to `TLBP`/
//! `TLBWR` (write random) when all entries are full. We model the same
//! shape without real MIPS TLB registers: a fixed-size table of
//! `(vpn, frame, dirty)` entries, replaced round-robin when full.

use alloc::vec::Vec;

use crate::config::NUM_TLB_ENTRIES;

#[derive(Debug, Clone, Copy)]
struct TlbEntry {
    vpn: u32,
    frame: u32,
    dirty: bool,
}

/// Per-process software TLB. Flushed wholesale on every address-space
/// switch, matching the original kernel's treatment of TLB entries as
/// not tagged by address space id.
pub struct SoftTlb {
    entries: Vec<TlbEntry>,
    next_victim: usize,
}

impl SoftTlb {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(NUM_TLB_ENTRIES),
            next_victim: 0,
        }
    }

    pub fn flush(&mut self) {
        self.entries.clear();
        self.next_victim = 0;
    }

    pub fn lookup(&self, vpn: u32) -> Option<(u32, bool)> {
        self.entries
            .iter()
            .find(|e| e.vpn == vpn)
            .map(|e| (e.frame, e.dirty))
    }

    /// Insert or update the mapping for `vpn`, evicting round-robin if
    /// the table is already full (`TLBWR`).
    pub fn insert(&mut self, vpn: u32, frame: u32, dirty: bool) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.vpn == vpn) {
            e.frame = frame;
            e.dirty = dirty;
            return;
        }
        let entry = TlbEntry { vpn, frame, dirty };
        if self.entries.len() < NUM_TLB_ENTRIES {
            self.entries.push(entry);
        } else {
            self.entries[self.next_victim] = entry;
            self.next_victim = (self.next_victim + 1) % NUM_TLB_ENTRIES;
        }
    }

    /// Drop any entry for `vpn`, e.g. when its page is evicted.
    pub fn invalidate(&mut self, vpn: u32) {
        self.entries.retain(|e| e.vpn != vpn);
    }
}

impl Default for SoftTlb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_lookup_round_trips() {
        let mut tlb = SoftTlb::new();
        tlb.insert(0x1000, 7, false);
        assert_eq!(tlb.lookup(0x1000), Some((7, false)));
    }

    #[test]
    fn full_table_evicts_round_robin() {
        let mut tlb = SoftTlb::new();
        for i in 0..NUM_TLB_ENTRIES as u32 {
            tlb.insert(i, i, false);
        }
        // table now full; one more insert must evict entry 0
        tlb.insert(NUM_TLB_ENTRIES as u32, 999, false);
        assert_eq!(tlb.lookup(0), None);
        assert_eq!(tlb.lookup(NUM_TLB_ENTRIES as u32), Some((999, false)));
    }

    #[test]
    fn invalidate_removes_single_entry() {
        let mut tlb = SoftTlb::new();
        tlb.insert(5, 5, false);
        tlb.invalidate(5);
        assert_eq!(tlb.lookup(5), None);
    }
}
