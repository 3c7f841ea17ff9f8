//! The shared terminal: a spin lock during boot (before the SQT lock
//! machinery is up), handed off to the SQT lock once scheduling starts, so
//! every cluster writes to the same sink without the boot-time and
//! post-boot locking disciplines fighting each other (spec §4.12/§5).

extern crate alloc;

use core::fmt::{self, Write};

use spin::Mutex;

use crate::mapping::ClusterId;
use crate::sync::SqtLock;

struct ConsoleSink;

impl ConsoleSink {
    const fn new() -> Self {
        Self
    }
}

impl Write for ConsoleSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            platform_putc(byte);
        }
        Ok(())
    }
}

#[cfg(not(test))]
fn platform_putc(byte: u8) {
    // The real target writes to the tty peripheral's MMIO port here; kept
    // as a single call site so swapping in the real address is one line.
    let _ = byte;
}

#[cfg(test)]
fn platform_putc(byte: u8) {
    TEST_OUTPUT.lock().push(byte);
}

#[cfg(test)]
static TEST_OUTPUT: Mutex<alloc::vec::Vec<u8>> = Mutex::new(alloc::vec::Vec::new());

static BOOT_CONSOLE: Mutex<ConsoleSink> = Mutex::new(ConsoleSink::new());

/// The post-boot console, fronted by a cluster-aware [`SqtLock`] so that a
/// cluster under heavy local logging doesn't contend the whole mesh's
/// console lock (spec §4.12). `CLUSTERS` is an upper bound on mesh size,
/// not the actual mesh shape in use.
static CONSOLE: SqtLock<ConsoleSink, { crate::config::MAX_X * crate::config::MAX_Y }> =
    SqtLock::new(ConsoleSink::new());

static BOOT_COMPLETE: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(false);

/// Marks boot complete; after this, writes go through the SQT lock instead
/// of the boot-time spin lock.
pub fn mark_boot_complete() {
    BOOT_COMPLETE.store(true, core::sync::atomic::Ordering::Release);
}

/// Which cluster the plain `print!`/`println!` macros write through. Each
/// processor sets this once, at boot, to its own cluster (there is no
/// per-core storage left in this tree to derive it from automatically, see
/// [`set_current_cluster`]); callers that already know their cluster should
/// prefer [`write_str_from`]/[`_print`] directly.
static CURRENT_CLUSTER: core::sync::atomic::AtomicUsize = core::sync::atomic::AtomicUsize::new(0);

pub fn set_current_cluster(cluster: ClusterId) {
    CURRENT_CLUSTER.store(cluster.index(), core::sync::atomic::Ordering::Relaxed);
}

pub fn current_cluster() -> ClusterId {
    ClusterId::from_index(CURRENT_CLUSTER.load(core::sync::atomic::Ordering::Relaxed))
}

pub fn write_str_from(cluster: ClusterId, s: &str) {
    if BOOT_COMPLETE.load(core::sync::atomic::Ordering::Acquire) {
        let _ = CONSOLE.lock(cluster).write_str(s);
    } else {
        let _ = BOOT_CONSOLE.lock().write_str(s);
    }
}

pub fn _print(cluster: ClusterId, args: fmt::Arguments) {
    if BOOT_COMPLETE.load(core::sync::atomic::Ordering::Acquire) {
        let _ = CONSOLE.lock(cluster).write_fmt(args);
    } else {
        let _ = BOOT_CONSOLE.lock().write_fmt(args);
    }
}

/// Writes to whatever cluster [`set_current_cluster`] last recorded for
/// this processor. Prefer [`_print`] with an explicit cluster when one is
/// already in hand (the logger does; most call sites don't).
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ({
        $crate::console::_print($crate::console::current_cluster(), format_args!($($arg)*));
    });
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($fmt:expr) => ($crate::print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::print!(concat!($fmt, "\n"), $($arg)*));
}
