//! The two-level table itself: a fixed 2048-entry L1 indexed by the high
//! bits of a virtual address, each entry either empty or pointing at a
//! 512-entry L2 whose entries hold a `Ppn` and access mode (spec §3/§4.3).

extern crate alloc;

use crate::config::{L1_ENTRIES, L2_ENTRIES};
use crate::mapping::AccessMode;
use crate::mem::ppn::Ppn;

/// One resolved leaf mapping.
#[derive(Clone, Copy, Debug)]
pub struct PageTableEntry {
    pub ppn: Ppn,
    pub mode: AccessMode,
}

#[derive(Clone, Copy)]
enum L1Slot {
    Empty,
    /// Index into the owning table's `l2` vec (T=1: "points-to-level-2").
    Table(usize),
    /// A direct big-page mapping (T=0): the level-1 entry itself is the
    /// leaf, no level-2 table is ever allocated for this slot.
    Big(PageTableEntry),
}

/// A second-level table: up to `L2_ENTRIES` leaf mappings.
pub struct L2Table {
    entries: [Option<PageTableEntry>; L2_ENTRIES],
}

impl L2Table {
    pub const fn new() -> Self {
        Self { entries: [None; L2_ENTRIES] }
    }

    pub const fn get(&self, index: usize) -> Option<PageTableEntry> {
        self.entries[index]
    }

    pub fn set(&mut self, index: usize, entry: PageTableEntry) -> Option<PageTableEntry> {
        self.entries[index].replace(entry)
    }
}

impl Default for L2Table {
    fn default() -> Self {
        Self::new()
    }
}

/// The top-level table for one vspace. Owns its L2 tables directly; a
/// vspace's table lifetime matches the vspace's.
pub struct L1Table {
    slots: [L1Slot; L1_ENTRIES],
    l2: alloc::vec::Vec<L2Table>,
}

impl L1Table {
    pub fn new() -> Self {
        Self {
            slots: [L1Slot::Empty; L1_ENTRIES],
            l2: alloc::vec::Vec::new(),
        }
    }

    /// Returns the L2 table index at `l1_index`, allocating a fresh L2
    /// table if this is the first reference through this slot.
    ///
    /// # Panics
    /// If `l1_index` already holds a big-page entry: a slot is either a
    /// small-page subtable or a big-page leaf, never both.
    pub fn l2_index_or_insert(&mut self, l1_index: usize) -> usize {
        match self.slots[l1_index] {
            L1Slot::Table(idx) => idx,
            L1Slot::Big(_) => panic!("level-1 slot {l1_index} already holds a big-page mapping"),
            L1Slot::Empty => {
                let idx = self.l2.len();
                self.l2.push(L2Table::new());
                self.slots[l1_index] = L1Slot::Table(idx);
                idx
            }
        }
    }

    pub fn l2_index(&self, l1_index: usize) -> Option<usize> {
        match self.slots[l1_index] {
            L1Slot::Table(idx) => Some(idx),
            L1Slot::Big(_) | L1Slot::Empty => None,
        }
    }

    /// The big-page entry installed directly at `l1_index`, if any.
    pub fn big_entry(&self, l1_index: usize) -> Option<PageTableEntry> {
        match self.slots[l1_index] {
            L1Slot::Big(entry) => Some(entry),
            L1Slot::Table(_) | L1Slot::Empty => None,
        }
    }

    /// Installs `entry` as a direct big-page mapping at `l1_index`.
    ///
    /// # Panics
    /// If `l1_index` already holds a small-page subtable.
    pub fn set_big_entry(&mut self, l1_index: usize, entry: PageTableEntry) {
        if let L1Slot::Table(_) = self.slots[l1_index] {
            panic!("level-1 slot {l1_index} already holds a small-page subtable");
        }
        self.slots[l1_index] = L1Slot::Big(entry);
    }

    pub fn l2(&self, idx: usize) -> &L2Table {
        &self.l2[idx]
    }

    pub fn l2_mut(&mut self, idx: usize) -> &mut L2Table {
        &mut self.l2[idx]
    }
}

impl Default for L1Table {
    fn default() -> Self {
        Self::new()
    }
}
