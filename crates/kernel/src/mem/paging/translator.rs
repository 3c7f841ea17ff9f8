//! Software virtual-to-physical translation, run with the data TLB disabled
//! for the duration of the walk so a concurrent table edit on another
//! processor of the same cluster can never be observed half-written
//! (grounded on the original mesh kernel's translation critical section).

use crate::config::{L2_ENTRIES, SMALL_PAGE_SIZE};
use crate::error::TranslateError;
use crate::mapping::AccessMode;
use crate::mem::ppn::{Ppn, VirtAddr};
use crate::platform;

use super::table::L1Table;

/// A resolved physical address, split the way a driver needs it: the page
/// number a bus-addressable descriptor takes, and the byte offset within
/// that page to add on top of it.
#[derive(Clone, Copy, Debug)]
pub struct Translated {
    pub ppn: Ppn,
    pub offset: usize,
}

/// Resolves `vaddr` through `table`, checking that `requested` is permitted
/// by the mapping's access mode.
pub fn translate(table: &L1Table, vaddr: VirtAddr, requested: AccessMode) -> Result<Translated, TranslateError> {
    platform::with_dtlb_disabled(|| translate_inner(table, vaddr, requested))
}

fn translate_inner(table: &L1Table, vaddr: VirtAddr, requested: AccessMode) -> Result<Translated, TranslateError> {
    let page = vaddr.value() / SMALL_PAGE_SIZE;
    let l1_index = page / L2_ENTRIES;
    let l2_index = page % L2_ENTRIES;
    let offset = vaddr.page_offset(SMALL_PAGE_SIZE);

    // T=0: the level-1 entry is itself a big-page leaf. Its PPN only
    // carries (x, y, bppi); the small-page index within the big page comes
    // from the virtual address, not from a level-2 lookup.
    if let Some(entry) = table.big_entry(l1_index) {
        if !entry.mode.permits(requested) {
            return Err(TranslateError::PermissionDenied { requested, allowed: entry.mode });
        }
        let ppn = Ppn::pack(entry.ppn.x(), entry.ppn.y(), entry.ppn.bppi(), l2_index as u32);
        return Ok(Translated { ppn, offset });
    }

    // T=1: walk into the level-2 table.
    let l2_idx = table.l2_index(l1_index).ok_or(TranslateError::NotMapped(vaddr))?;
    let entry = table.l2(l2_idx).get(l2_index).ok_or(TranslateError::NotMapped(vaddr))?;

    if !entry.mode.permits(requested) {
        return Err(TranslateError::PermissionDenied { requested, allowed: entry.mode });
    }

    Ok(Translated { ppn: entry.ppn, offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::paging::table::PageTableEntry;

    #[test]
    fn identity_mapped_page_round_trips() {
        let mut table = L1Table::new();
        let vaddr = VirtAddr::new(0x2000);
        let ppn = Ppn::pack(1, 2, 5, 0);
        let l1 = 0x2000 / SMALL_PAGE_SIZE / L2_ENTRIES;
        let l2i = 0x2000 / SMALL_PAGE_SIZE % L2_ENTRIES;
        let idx = table.l2_index_or_insert(l1);
        table.l2_mut(idx).set(l2i, PageTableEntry { ppn, mode: AccessMode::RW });

        let resolved = translate(&table, vaddr, AccessMode::RO).unwrap();
        assert_eq!(resolved.ppn.x(), 1);
        assert_eq!(resolved.ppn.y(), 2);
        assert_eq!(resolved.offset, 0);
    }

    #[test]
    fn unmapped_address_faults() {
        let table = L1Table::new();
        assert!(matches!(
            translate(&table, VirtAddr::new(0x9000), AccessMode::RO),
            Err(TranslateError::NotMapped(_))
        ));
    }

    #[test]
    fn permission_denied_when_mode_insufficient() {
        let mut table = L1Table::new();
        let vaddr = VirtAddr::new(0x1000);
        let idx = table.l2_index_or_insert(0);
        table.l2_mut(idx).set(1, PageTableEntry { ppn: Ppn::pack(0, 0, 0, 0), mode: AccessMode::RO });
        let result = translate(&table, vaddr, AccessMode::RW);
        assert!(matches!(result, Err(TranslateError::PermissionDenied { .. })));
    }

    #[test]
    fn big_page_entry_resolves_without_touching_level_two() {
        let mut table = L1Table::new();
        let big_ppn = Ppn::pack(3, 1, 7, 0);
        table.set_big_entry(2, PageTableEntry { ppn: big_ppn, mode: AccessMode::RWX });

        // Offset 0x180_0000 / SMALL_PAGE_SIZE falls in l1 slot 2 (l2 index 3).
        let vaddr = VirtAddr::new(2 * L2_ENTRIES * SMALL_PAGE_SIZE + 3 * SMALL_PAGE_SIZE + 0x10);
        let resolved = translate(&table, vaddr, AccessMode::RO).unwrap();
        assert_eq!(resolved.ppn.x(), 3);
        assert_eq!(resolved.ppn.y(), 1);
        assert_eq!(resolved.ppn.bppi(), 7);
        assert_eq!(resolved.ppn.sppi(), 3);
        assert_eq!(resolved.offset, 0x10);
    }

    #[test]
    fn big_page_permission_denied_when_mode_insufficient() {
        let mut table = L1Table::new();
        table.set_big_entry(0, PageTableEntry { ppn: Ppn::pack(0, 0, 0, 0), mode: AccessMode::RO });
        let result = translate(&table, VirtAddr::new(0x10), AccessMode::RW);
        assert!(matches!(result, Err(TranslateError::PermissionDenied { .. })));
    }
}
