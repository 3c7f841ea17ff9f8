//! The mapping image: the arena-of-structs description of the machine and
//! the software running on it, produced off-target and loaded verbatim at
//! boot (spec §3/§4.1).

mod loader;

pub use loader::{MappingImage, MappingImageHeader};

use bitflags::bitflags;
use derive_more::{Deref, From};

macro_rules! index_newtype {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, Deref)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            pub const fn from_index(index: usize) -> Self {
                Self(index)
            }

            pub const fn index(self) -> usize {
                self.0
            }
        }
    };
}

index_newtype!(ClusterId);
index_newtype!(PsegId);
index_newtype!(VspaceId);
index_newtype!(VsegId);
index_newtype!(TaskId);
index_newtype!(ProcId);
index_newtype!(IrqId);
index_newtype!(PeriphId);

/// Access permissions a vseg grants over its virtual range.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AccessMode {
    pub read: bool,
    pub write: bool,
    pub exec: bool,
    pub cacheable: bool,
}

impl AccessMode {
    pub const RWX: Self = Self { read: true, write: true, exec: true, cacheable: true };
    pub const RW: Self = Self { read: true, write: true, exec: false, cacheable: true };
    pub const RX: Self = Self { read: true, write: false, exec: true, cacheable: true };
    pub const RO: Self = Self { read: true, write: false, exec: false, cacheable: true };

    /// True if `self` permits everything `requested` asks for.
    pub const fn permits(self, requested: Self) -> bool {
        (!requested.read || self.read)
            && (!requested.write || self.write)
            && (!requested.exec || self.exec)
    }
}

bitflags! {
    /// Reasons a thread is excluded from the round-robin pick, spec §5/§9.
    /// Closed set: unknown bits are rejected at the boundary rather than
    /// silently ignored.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct NorunMask: u8 {
        const TASK_KILLED  = 0b001;
        const IO_BLOCK     = 0b010;
        const COPROC_BLOCK = 0b100;
    }

    /// Pending scheduler-visible signals for a thread, spec §5/§9.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct SignalMask: u8 {
        const KILL = 0b01;
        const EXEC = 0b10;
    }
}

/// Whether a pseg backs allocations or is a device's MMIO window.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PsegKind {
    Ram,
    Peri,
}

/// A physical segment: a named, typed region of one cluster's local memory.
#[derive(Clone, Copy, Debug)]
pub struct Pseg {
    pub cluster: ClusterId,
    pub kind: PsegKind,
    pub base: usize,
    pub size: usize,
}

/// What role a vseg plays, driving how the builder resolves and shares its
/// backing pages.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VsegKind {
    Code,
    Data,
    Scheduler,
    PageTableArea,
    Peripheral,
    Buffer,
    Heap,
}

/// A virtual segment: a range in some vspace's address space, backed by one
/// pseg, with a fixed access mode.
#[derive(Clone, Copy, Debug)]
pub struct Vseg {
    pub vspace: VspaceId,
    pub base: usize,
    pub size: usize,
    pub pseg: PsegId,
    pub mode: AccessMode,
    pub kind: VsegKind,
    /// True if every virtual page maps identically to a physical page
    /// (identity-ish layouts use this to skip real translation).
    pub identity: bool,
    /// True if this vseg is covered by big (2 MiB) pages rather than small
    /// (4 KiB) ones.
    pub big: bool,
    /// True if this vseg's PTEs are installed only in the home cluster of
    /// its pseg; false means every cluster that has processors gets a copy
    /// (spec §4.3's replication matrix).
    pub local: bool,
    /// True if this vseg's PTEs are installed into every vspace's table,
    /// not just the vspace named by `vspace` (spec §4.3's replication
    /// matrix).
    pub global: bool,
}

/// A virtual address space shared by one or more tasks.
#[derive(Clone, Copy, Debug)]
pub struct Vspace {
    pub id: VspaceId,
}

/// A schedulable thread of control, bound to a vspace and a home processor.
#[derive(Clone, Copy, Debug)]
pub struct Task {
    pub vspace: VspaceId,
    pub proc: ProcId,
    pub entry: usize,
    pub stack_vseg: VsegId,
}

/// One mesh cluster: its coordinates and its slice of each flat
/// cluster-indexed table (psegs, processors, peripherals), matching the
/// wire format's `(x, y, pseg_offset, pseg_count, proc_offset, proc_count,
/// periph_offset, periph_count)` record (spec §6).
#[derive(Clone, Copy, Debug)]
pub struct Cluster {
    pub x: u32,
    pub y: u32,
    pub pseg_offset: usize,
    pub pseg_count: usize,
    pub proc_offset: usize,
    pub proc_count: usize,
    pub periph_offset: usize,
    pub periph_count: usize,
}

impl Cluster {
    /// Whether this cluster hosts at least one processor; clusters without
    /// one never run scheduling and their global vsegs are finished by a
    /// designated remote processor instead (spec §4.11 phase 2).
    pub const fn has_processors(&self) -> bool {
        self.proc_count > 0
    }
}

/// A peripheral's MMIO window and which cluster it is attached to.
#[derive(Clone, Copy, Debug)]
pub struct Peripheral {
    pub cluster: ClusterId,
    pub base: usize,
    pub size: usize,
    pub kind: PeripheralKind,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PeripheralKind {
    Tty,
    BlockDevice,
    ChainedDma,
    Coprocessor,
    Timer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_mode_permits_is_conservative() {
        assert!(AccessMode::RWX.permits(AccessMode::RO));
        assert!(!AccessMode::RO.permits(AccessMode::RW));
    }

    #[test]
    fn norun_mask_rejects_unknown_bits() {
        assert!(NorunMask::from_bits(0b1000).is_none());
        assert_eq!(NorunMask::from_bits(0b011).unwrap(), NorunMask::TASK_KILLED | NorunMask::IO_BLOCK);
    }
}
