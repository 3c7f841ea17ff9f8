//! A thread's saved execution state. The actual register layout is
//! processor-specific and out of scope here (spec's Non-goals); this is
//! the generic save area every processor's trap entry fills in and the
//! scheduler hands back on a switch, the same shape as the teacher's
//! `ArchContext` (`arch/aarch64/task.rs`) kept abstract instead of
//! pinned to one real ISA.

use crate::mapping::{ProcId, TaskId, VspaceId};

#[derive(Clone, Copy, Debug, Default)]
pub struct SavedRegisters {
    pub pc: usize,
    pub sp: usize,
    pub gpr: [usize; 32],
}

/// Everything the scheduler needs about one thread besides its saved
/// registers: identity, home processor, and owning vspace (for the page
/// table to install on switch-in).
pub struct ThreadContext {
    pub task: TaskId,
    pub home: ProcId,
    pub vspace: VspaceId,
    pub regs: SavedRegisters,
}

impl ThreadContext {
    pub const fn new(task: TaskId, home: ProcId, vspace: VspaceId) -> Self {
        Self {
            task,
            home,
            vspace,
            regs: SavedRegisters { pc: 0, sp: 0, gpr: [0; 32] },
        }
    }
}
