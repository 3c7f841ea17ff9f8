//! Per-processor round-robin scheduler. Each processor owns a fixed table
//! of threads; picking the next one to run first drains pending `kill`/
//! `exec` signals (kill before exec, matching the original ordering) and
//! then advances a round-robin cursor over whatever remains runnable,
//! falling back to the idle task when nothing is (spec §4.5/§9, grounded
//! on `original_source/giet_kernel/ctx_handler.c`).

extern crate alloc;

use alloc::vec::Vec;

use crate::error::SchedError;
use crate::mapping::{NorunMask, SignalMask, TaskId};

struct ThreadSlot {
    task: TaskId,
    norun: NorunMask,
    signal: SignalMask,
}

/// What happened to a thread as its pending signals were drained.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SignalEvent {
    Killed(TaskId),
    ExecRequested(TaskId),
}

pub struct Scheduler {
    threads: Vec<ThreadSlot>,
    cursor: usize,
    idle: TaskId,
    current: Option<TaskId>,
}

impl Scheduler {
    pub const fn new(idle: TaskId) -> Self {
        Self { threads: Vec::new(), cursor: 0, idle, current: None }
    }

    /// The task this processor's last `pick_next` call returned, read back
    /// by the logger to tag each line (spec's ambient stack; see
    /// SPEC_FULL.md's Logging section).
    pub const fn current(&self) -> Option<TaskId> {
        self.current
    }

    pub fn add_thread(&mut self, task: TaskId) -> usize {
        self.threads.push(ThreadSlot { task, norun: NorunMask::empty(), signal: SignalMask::empty() });
        self.threads.len() - 1
    }

    pub fn set_norun(&mut self, slot: usize, reason: NorunMask) {
        self.threads[slot].norun.insert(reason);
    }

    pub fn clear_norun(&mut self, slot: usize, reason: NorunMask) {
        self.threads[slot].norun.remove(reason);
    }

    pub fn raise_signal(&mut self, slot: usize, signal: SignalMask) {
        self.threads[slot].signal.insert(signal);
    }

    /// Processes pending kill/exec signals, returning what happened, in
    /// the order the signals were found. Thread identity is fixed for the
    /// slot's lifetime, so a kill never removes it: it sets `TASK_KILLED`
    /// in the slot's norun mask and clears the kill bit, leaving the
    /// context in place. An exec request clears the thread's norun state
    /// (a fresh image is assumed runnable) but leaves it in place for the
    /// caller to overwrite with the new entry point.
    pub fn drain_signals(&mut self) -> Vec<SignalEvent> {
        let mut events = Vec::new();
        for i in 0..self.threads.len() {
            if self.threads[i].signal.contains(SignalMask::KILL) {
                self.threads[i].signal.remove(SignalMask::KILL);
                self.threads[i].norun.insert(NorunMask::TASK_KILLED);
                events.push(SignalEvent::Killed(self.threads[i].task));
                continue;
            }
            if self.threads[i].signal.contains(SignalMask::EXEC) {
                self.threads[i].signal.remove(SignalMask::EXEC);
                self.threads[i].norun = NorunMask::empty();
                events.push(SignalEvent::ExecRequested(self.threads[i].task));
            }
        }
        events
    }

    /// Picks the next runnable thread after draining signals, or the idle
    /// task if none is runnable.
    pub fn pick_next(&mut self) -> Result<TaskId, SchedError> {
        self.drain_signals();

        if self.threads.is_empty() {
            self.current = Some(self.idle);
            return Ok(self.idle);
        }

        let len = self.threads.len();
        for offset in 1..=len {
            let idx = (self.cursor + offset) % len;
            if self.threads[idx].norun.is_empty() {
                self.cursor = idx;
                let task = self.threads[idx].task;
                self.current = Some(task);
                return Ok(task);
            }
        }
        self.current = Some(self.idle);
        Ok(self.idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(n: usize) -> TaskId {
        TaskId::from_index(n)
    }

    #[test]
    fn round_robins_over_runnable_threads() {
        let mut sched = Scheduler::new(task(99));
        sched.add_thread(task(0));
        sched.add_thread(task(1));
        let first = sched.pick_next().unwrap();
        let second = sched.pick_next().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn pick_next_updates_the_readable_current_task() {
        let mut sched = Scheduler::new(task(99));
        sched.add_thread(task(7));
        assert_eq!(sched.current(), None);
        let picked = sched.pick_next().unwrap();
        assert_eq!(sched.current(), Some(picked));
    }

    #[test]
    fn blocked_thread_is_skipped() {
        let mut sched = Scheduler::new(task(99));
        sched.add_thread(task(0));
        let idx1 = sched.add_thread(task(1));
        sched.set_norun(idx1, NorunMask::IO_BLOCK);
        for _ in 0..4 {
            assert_eq!(sched.pick_next().unwrap(), task(0));
        }
    }

    #[test]
    fn falls_back_to_idle_when_everything_is_blocked() {
        let mut sched = Scheduler::new(task(99));
        let idx0 = sched.add_thread(task(0));
        sched.set_norun(idx0, NorunMask::TASK_KILLED);
        assert_eq!(sched.pick_next().unwrap(), task(99));
    }

    #[test]
    fn kill_signal_marks_task_killed_without_removing_the_slot() {
        let mut sched = Scheduler::new(task(99));
        let idx0 = sched.add_thread(task(0));
        sched.add_thread(task(1));
        sched.raise_signal(idx0, SignalMask::KILL);
        let events = sched.drain_signals();
        assert_eq!(events, alloc::vec![SignalEvent::Killed(task(0))]);
        assert_eq!(sched.threads.len(), 2);
        assert!(sched.threads[idx0].norun.contains(NorunMask::TASK_KILLED));
        assert!(!sched.threads[idx0].signal.contains(SignalMask::KILL));
        assert_eq!(sched.pick_next().unwrap(), task(1));
    }
}
