//! Coprocessor driver with three access modes: shared (any thread may use
//! it, serialized), polled-DMA (the caller busy-waits its own transfer
//! descriptor queue), and interrupt-DMA (the caller is woken by the
//! coprocessor's completion interrupt) — spec §4.10.

use crate::error::DriverError;
use crate::mapping::TaskId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CoprocMode {
    Shared,
    PolledDma,
    InterruptDma,
}

pub struct CoprocDriver {
    owner: Option<TaskId>,
    mode: CoprocMode,
}

impl CoprocDriver {
    pub const fn new() -> Self {
        Self { owner: None, mode: CoprocMode::Shared }
    }

    /// Reserves the coprocessor channel for `task` in `mode`. Only one
    /// task may hold a non-shared channel at a time.
    pub fn acquire(&mut self, task: TaskId, mode: CoprocMode) -> Result<(), DriverError> {
        match (self.owner, mode) {
            (None, _) => {
                self.owner = Some(task);
                self.mode = mode;
                Ok(())
            }
            (Some(_), CoprocMode::Shared) if self.mode == CoprocMode::Shared => Ok(()),
            _ => Err(DriverError::CoprocBusy),
        }
    }

    pub fn release(&mut self, task: TaskId) {
        if self.owner == Some(task) && self.mode != CoprocMode::Shared {
            self.owner = None;
        }
    }

    pub const fn mode(&self) -> CoprocMode {
        self.mode
    }

    pub const fn owner(&self) -> Option<TaskId> {
        self.owner
    }
}

impl Default for CoprocDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_mode_rejects_a_second_owner() {
        let mut drv = CoprocDriver::new();
        drv.acquire(TaskId::from_index(0), CoprocMode::PolledDma).unwrap();
        assert!(matches!(
            drv.acquire(TaskId::from_index(1), CoprocMode::PolledDma),
            Err(DriverError::CoprocBusy)
        ));
    }

    #[test]
    fn shared_mode_allows_multiple_acquirers() {
        let mut drv = CoprocDriver::new();
        drv.acquire(TaskId::from_index(0), CoprocMode::Shared).unwrap();
        drv.acquire(TaskId::from_index(1), CoprocMode::Shared).unwrap();
    }

    #[test]
    fn release_frees_an_exclusive_channel() {
        let mut drv = CoprocDriver::new();
        drv.acquire(TaskId::from_index(0), CoprocMode::InterruptDma).unwrap();
        drv.release(TaskId::from_index(0));
        assert!(drv.owner().is_none());
        drv.acquire(TaskId::from_index(1), CoprocMode::InterruptDma).unwrap();
    }
}
