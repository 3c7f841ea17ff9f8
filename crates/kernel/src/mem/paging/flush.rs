//! Flush guards enforcing "no page table edit takes effect until flushed".
//!
//! Matches the teacher's discipline of returning a `#[must_use]` token from
//! every table mutation instead of invalidating eagerly, generalized here
//! to the mesh's software DTLB (disable-update-reenable) rather than a
//! hardware `invlpg`.

use crate::mem::ppn::VirtAddr;
use crate::platform;

#[must_use = "page table changes must be flushed before the mapping is relied on"]
pub struct PageFlush(VirtAddr);

impl PageFlush {
    pub const fn new(addr: VirtAddr) -> Self {
        Self(addr)
    }

    pub fn flush(self) {
        platform::invalidate_page(self.0);
    }

    /// Defers the flush to a caller who will batch it with others.
    pub fn ignore(self) {
        core::mem::forget(self);
    }
}

#[must_use = "page table changes must be flushed before the mapping is relied on"]
pub struct PageFlushAll;

impl PageFlushAll {
    pub const fn new() -> Self {
        Self
    }

    pub fn flush(self) {
        platform::invalidate_all();
    }

    pub fn ignore(self) {
        core::mem::forget(self);
    }
}

impl Default for PageFlushAll {
    fn default() -> Self {
        Self::new()
    }
}
