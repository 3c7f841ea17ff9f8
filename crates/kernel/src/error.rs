//! Per-subsystem error types and the fatal/recoverable taxonomy of spec §7.

use thiserror::Error;

/// How the caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The whole machine must halt; state cannot be trusted past this point.
    FatalKernel,
    /// Only the offending thread is killed; the rest of the system continues.
    FatalThread,
    /// A driver can retry or report failure to its caller without killing
    /// anything.
    RecoverableDriver,
    /// Expected and routine (e.g. a full ring buffer); not logged as an error.
    Transient,
}

/// Implemented by every subsystem error so call sites can dispatch on
/// severity uniformly instead of re-deriving the policy each time.
pub trait Severity {
    fn severity(&self) -> ErrorSeverity;
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("bad mapping image signature")]
    BadSignature,
    #[error("mesh dimensions in image ({x}x{y}) exceed compiled limits")]
    MeshTooLarge { x: usize, y: usize },
    #[error("index {index} out of range for table of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl Severity for MappingError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::FatalKernel
    }
}

#[derive(Debug, Error)]
pub enum PhysAllocError {
    #[error("cluster {0:?} has no big pages left")]
    BigPagesExhausted(crate::mapping::ClusterId),
    #[error("current big page has no small pages left")]
    SmallPagesExhausted,
}

impl Severity for PhysAllocError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::FatalKernel
    }
}

#[derive(Debug, Error)]
pub enum PageTableError {
    #[error("vseg {second:?} conflicts in access mode with an earlier mapping of the same page")]
    ModeConflict { second: crate::mapping::VsegId },
    #[error(transparent)]
    Alloc(#[from] PhysAllocError),
}

impl Severity for PageTableError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PageTableError::ModeConflict { .. } => ErrorSeverity::FatalKernel,
            PageTableError::Alloc(e) => e.severity(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("virtual address {0:?} is not covered by any vseg of this vspace")]
    NotMapped(crate::mem::ppn::VirtAddr),
    #[error("access mode {requested:?} not permitted by vseg (allows {allowed:?})")]
    PermissionDenied {
        requested: crate::mapping::AccessMode,
        allowed: crate::mapping::AccessMode,
    },
}

impl Severity for TranslateError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::FatalThread
    }
}

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("no runnable thread on this processor and no idle task installed")]
    NoRunnableThread,
}

impl Severity for SchedError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::FatalKernel
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("block device reported an I/O error")]
    BlockIo,
    #[error("chained DMA buffer is full")]
    CmaFull,
    #[error("chained DMA buffer is empty")]
    CmaEmpty,
    #[error("coprocessor channel is already in use")]
    CoprocBusy,
    #[error("polling budget exceeded waiting on device")]
    Timeout,
    #[error("buffer physical address is not cache-line aligned")]
    Misaligned,
    #[error("command list has no free slot")]
    NoFreeSlot,
}

impl Severity for DriverError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            DriverError::CmaFull | DriverError::CmaEmpty => ErrorSeverity::Transient,
            _ => ErrorSeverity::RecoverableDriver,
        }
    }
}

/// Crate-wide error composed at boundaries that can see more than one
/// subsystem (syscall dispatch, boot sequencer).
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Alloc(#[from] PhysAllocError),
    #[error(transparent)]
    PageTable(#[from] PageTableError),
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error(transparent)]
    Sched(#[from] SchedError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl Severity for KernelError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            KernelError::Mapping(e) => e.severity(),
            KernelError::Alloc(e) => e.severity(),
            KernelError::PageTable(e) => e.severity(),
            KernelError::Translate(e) => e.severity(),
            KernelError::Sched(e) => e.severity(),
            KernelError::Driver(e) => e.severity(),
        }
    }
}
