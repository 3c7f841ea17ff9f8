//! The idle task every processor's scheduler falls back to when its
//! thread table has nothing runnable (spec §4.5).

use crate::mapping::{ProcId, TaskId, VspaceId};

use super::context::ThreadContext;

/// Builds the idle thread context for `proc`. The idle task never
/// terminates and is never placed in the schedulable table itself — the
/// scheduler returns its id directly instead of round-robining over it.
pub fn idle_context(proc: ProcId, idle_task: TaskId, kernel_vspace: VspaceId) -> ThreadContext {
    ThreadContext::new(idle_task, proc, kernel_vspace)
}
