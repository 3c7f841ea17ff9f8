//! The syscall surface: a fixed dispatch table plus the ambient queries
//! (`proc-xyp`, `affinity`) the original kernel exposed as ordinary
//! functions rather than numbered calls (spec §6, SPEC_FULL.md §6).

pub mod errno;
pub mod table;

pub use errno::Errno;
pub use table::{SyscallHandler, SyscallTable, affinity, proc_xyp};
