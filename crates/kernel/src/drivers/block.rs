//! Block device driver with two waiting disciplines: polling (the caller's
//! processor busy-waits on the device register) and descheduling (the
//! caller's thread is parked and the processor moves on, to be woken by
//! the device's completion interrupt) — spec §4.8. Also covers the
//! multi-channel variant, whose single command register is replaced by a
//! 32-entry command list the ISR scans for newly finished slots.

use bitvec::order::Lsb0;
use bitvec::view::BitView;

use crate::config::{BLOCK_MC_SLOTS, CACHE_LINE_SIZE};
use crate::error::DriverError;
use crate::irq::mailbox::MailboxBank;
use crate::mapping::{ClusterId, IrqId, NorunMask, PeriphId, TaskId};
use crate::mem::ppn::PhysAddr;
use crate::platform;
use crate::sync::{SqtLock, poll_with_retries};

extern crate alloc;
use alloc::vec::Vec;

/// A fake in-memory device register file standing in for the real MMIO
/// window, so the driver's state machine can run on the host (spec §8
/// scenario 2/3).
#[derive(Default)]
pub struct FakeBlockRegisters {
    pub busy: bool,
    pub done: bool,
    pub error: bool,
}

pub enum WaitMode {
    Polling { attempts: usize },
    Descheduling,
}

/// What a descheduling-mode request should do with the caller's thread.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockOutcome {
    Completed,
    Deschedule(TaskId),
}

/// Result of [`BlockDriver::access`]: the wait outcome, and in the IRQ
/// case the mailbox slot that must be released once the transfer
/// completes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockAccessResult {
    pub outcome: BlockOutcome,
    pub irq: Option<IrqId>,
}

fn check_alignment(paddr: PhysAddr) -> Result<(), DriverError> {
    if paddr.value() % CACHE_LINE_SIZE != 0 {
        Err(DriverError::Misaligned)
    } else {
        Ok(())
    }
}

pub struct BlockDriver {
    periph: PeriphId,
    regs: FakeBlockRegisters,
}

impl BlockDriver {
    pub const fn new(periph: PeriphId) -> Self {
        Self { periph, regs: FakeBlockRegisters { busy: false, done: false, error: false } }
    }

    pub fn regs_mut(&mut self) -> &mut FakeBlockRegisters {
        &mut self.regs
    }

    /// Starts a transfer of `count` sectors at `lba` into/out of `paddr`.
    /// Rejects a misaligned buffer before touching the device, and runs
    /// the coherence op the transfer direction requires: invalidate before
    /// a device write into memory, flush before a device read out of it
    /// (spec §4.8).
    #[allow(clippy::too_many_arguments)]
    pub fn access(
        &mut self,
        mailboxes: &mut MailboxBank,
        norun: &mut NorunMask,
        caller: TaskId,
        use_irq: bool,
        to_mem: bool,
        lba: usize,
        paddr: PhysAddr,
        count: usize,
    ) -> Result<BlockAccessResult, DriverError> {
        check_alignment(paddr)?;

        let len = count * crate::config::SECTOR_SIZE;
        if to_mem {
            platform::cache_invalidate(paddr, len);
        } else {
            platform::cache_flush(paddr, len);
        }

        let _ = lba;
        self.regs.busy = true;
        self.regs.done = false;
        self.regs.error = false;

        if use_irq {
            let irq = mailboxes.alloc(self.periph).ok_or(DriverError::BlockIo)?;
            norun.insert(NorunMask::IO_BLOCK);
            return Ok(BlockAccessResult { outcome: BlockOutcome::Deschedule(caller), irq: Some(irq) });
        }

        Ok(BlockAccessResult { outcome: BlockOutcome::Deschedule(caller), irq: None })
    }

    /// Waits for the in-flight transfer in polling mode. Only valid after
    /// an `access` call with `use_irq: false`; descheduling-mode callers
    /// instead wait for [`BlockDriver::complete_interrupt`].
    pub fn wait_polling(&mut self, attempts: usize) -> Result<BlockOutcome, DriverError> {
        poll_with_retries(attempts, || if self.regs.done { Some(()) } else { None })?;
        if self.regs.error {
            Err(DriverError::BlockIo)
        } else {
            Ok(BlockOutcome::Completed)
        }
    }

    /// Called from the device's completion interrupt handler; wakes a
    /// thread that previously deschedule-waited on this transfer and
    /// releases the mailbox slot it was routed through.
    pub fn complete_interrupt(
        &mut self,
        mailboxes: &mut MailboxBank,
        norun: &mut NorunMask,
        irq: IrqId,
    ) -> Result<(), DriverError> {
        self.regs.busy = false;
        self.regs.done = true;
        mailboxes.release(irq);
        norun.remove(NorunMask::IO_BLOCK);
        if self.regs.error {
            Err(DriverError::BlockIo)
        } else {
            Ok(())
        }
    }
}

/// One in-flight transfer on the multi-channel controller's command list.
#[derive(Clone, Copy)]
struct BlockDescriptor {
    lba: usize,
    paddr: PhysAddr,
    count: usize,
    to_mem: bool,
}

impl BlockDescriptor {
    const EMPTY: Self = Self { lba: 0, paddr: PhysAddr::NULL, count: 0, to_mem: false };
}

/// The multi-channel controller's fixed-size command list: a bitmap of
/// which of `BLOCK_MC_SLOTS` descriptor slots are in flight, scanned by
/// the ISR against the device's pending-completion register to find
/// slots that finished since the last scan.
struct CommandList {
    active: u32,
    descriptors: [BlockDescriptor; BLOCK_MC_SLOTS],
}

impl CommandList {
    const fn new() -> Self {
        Self { active: 0, descriptors: [BlockDescriptor::EMPTY; BLOCK_MC_SLOTS] }
    }

    fn alloc(&mut self) -> Option<usize> {
        let slot = self.active.view_bits::<Lsb0>().first_zero()?;
        self.active.view_bits_mut::<Lsb0>().set(slot, true);
        Some(slot)
    }

    fn free(&mut self, slot: usize) {
        self.active.view_bits_mut::<Lsb0>().set(slot, false);
    }

    /// Slots that were active and are no longer pending per the device's
    /// `pending` bitmap: the completions the ISR must service this pass.
    fn completions(&self, pending: u32) -> Vec<usize> {
        let active = self.active.view_bits::<Lsb0>();
        let pending = pending.view_bits::<Lsb0>();
        (0..BLOCK_MC_SLOTS).filter(|&i| active[i] && !pending[i]).collect()
    }
}

/// Multi-channel block controller: up to `BLOCK_MC_SLOTS` transfers can be
/// outstanding at once, each cluster's submissions serialized through an
/// SQT lock over the shared command list (spec §4.7/§4.8).
pub struct MultiChannelBlockDriver {
    periph: PeriphId,
    commands: SqtLock<CommandList, { crate::config::MAX_X * crate::config::MAX_Y }>,
}

impl MultiChannelBlockDriver {
    pub const fn new(periph: PeriphId) -> Self {
        Self { periph, commands: SqtLock::new(CommandList::new()) }
    }

    pub const fn periph(&self) -> PeriphId {
        self.periph
    }

    /// Submits a transfer, returning the command-list slot it was placed
    /// in. Rejects a misaligned buffer and a full command list without
    /// touching the device.
    pub fn submit(
        &self,
        cluster: ClusterId,
        lba: usize,
        paddr: PhysAddr,
        count: usize,
        to_mem: bool,
    ) -> Result<usize, DriverError> {
        check_alignment(paddr)?;

        let len = count * crate::config::SECTOR_SIZE;
        if to_mem {
            platform::cache_invalidate(paddr, len);
        } else {
            platform::cache_flush(paddr, len);
        }

        let mut list = self.commands.lock(cluster);
        let slot = list.alloc().ok_or(DriverError::NoFreeSlot)?;
        list.descriptors[slot] = BlockDescriptor { lba, paddr, count, to_mem };
        Ok(slot)
    }

    /// Called from the controller's ISR: compares the device's current
    /// pending bitmap against the slots we last knew to be active, frees
    /// each one that finished, and returns which slots those were.
    pub fn scan_completions(&self, cluster: ClusterId, pending: u32) -> Vec<usize> {
        let mut list = self.commands.lock(cluster);
        let done = list.completions(pending);
        for &slot in &done {
            list.free(slot);
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ProcId;

    fn paddr(aligned: usize) -> PhysAddr {
        PhysAddr::new(aligned * CACHE_LINE_SIZE)
    }

    #[test]
    fn access_rejects_a_misaligned_buffer_before_touching_the_device() {
        let mut drv = BlockDriver::new(PeriphId::from_index(0));
        let mut mailboxes = MailboxBank::new(ProcId::from_index(0));
        let mut norun = NorunMask::empty();
        let result = drv.access(&mut mailboxes, &mut norun, TaskId::from_index(1), false, true, 0, PhysAddr::new(1), 4);
        assert!(matches!(result, Err(DriverError::Misaligned)));
        assert!(!drv.regs_mut().busy);
    }

    #[test]
    fn irq_access_allocates_a_mailbox_and_sets_io_block() {
        let mut drv = BlockDriver::new(PeriphId::from_index(3));
        let mut mailboxes = MailboxBank::new(ProcId::from_index(0));
        let mut norun = NorunMask::empty();
        let result = drv
            .access(&mut mailboxes, &mut norun, TaskId::from_index(7), true, true, 0, paddr(1), 4)
            .unwrap();
        assert!(norun.contains(NorunMask::IO_BLOCK));
        let irq = result.irq.unwrap();
        assert_eq!(mailboxes.owner(irq), Some(PeriphId::from_index(3)));
        assert_eq!(result.outcome, BlockOutcome::Deschedule(TaskId::from_index(7)));
    }

    #[test]
    fn complete_interrupt_clears_io_block_and_releases_the_mailbox() {
        let mut drv = BlockDriver::new(PeriphId::from_index(3));
        let mut mailboxes = MailboxBank::new(ProcId::from_index(0));
        let mut norun = NorunMask::empty();
        let result = drv
            .access(&mut mailboxes, &mut norun, TaskId::from_index(7), true, true, 0, paddr(1), 4)
            .unwrap();
        let irq = result.irq.unwrap();
        drv.regs_mut().done = true;
        drv.complete_interrupt(&mut mailboxes, &mut norun, irq).unwrap();
        assert!(!norun.contains(NorunMask::IO_BLOCK));
        assert_eq!(mailboxes.owner(irq), None);
    }

    #[test]
    fn polling_mode_blocks_until_device_reports_done() {
        let mut drv = BlockDriver::new(PeriphId::from_index(0));
        let mut mailboxes = MailboxBank::new(ProcId::from_index(0));
        let mut norun = NorunMask::empty();
        drv.access(&mut mailboxes, &mut norun, TaskId::from_index(1), false, true, 0, paddr(1), 4).unwrap();
        drv.regs_mut().done = true;
        let outcome = drv.wait_polling(4).unwrap();
        assert_eq!(outcome, BlockOutcome::Completed);
    }

    #[test]
    fn polling_mode_times_out_if_device_never_completes() {
        let mut drv = BlockDriver::new(PeriphId::from_index(0));
        let mut mailboxes = MailboxBank::new(ProcId::from_index(0));
        let mut norun = NorunMask::empty();
        drv.access(&mut mailboxes, &mut norun, TaskId::from_index(1), false, true, 0, paddr(1), 4).unwrap();
        let result = drv.wait_polling(4);
        assert!(matches!(result, Err(DriverError::Timeout)));
    }

    #[test]
    fn multi_channel_submit_rejects_misaligned_buffer() {
        let drv = MultiChannelBlockDriver::new(PeriphId::from_index(0));
        let result = drv.submit(ClusterId::from_index(0), 0, PhysAddr::new(1), 4, true);
        assert!(matches!(result, Err(DriverError::Misaligned)));
    }

    #[test]
    fn multi_channel_exhausts_after_block_mc_slots_submissions() {
        let drv = MultiChannelBlockDriver::new(PeriphId::from_index(0));
        for i in 0..BLOCK_MC_SLOTS {
            assert!(drv.submit(ClusterId::from_index(0), i, paddr(i + 1), 1, true).is_ok());
        }
        assert!(matches!(
            drv.submit(ClusterId::from_index(0), 99, paddr(99), 1, true),
            Err(DriverError::NoFreeSlot)
        ));
    }

    #[test]
    fn scan_completions_frees_slots_no_longer_pending() {
        let drv = MultiChannelBlockDriver::new(PeriphId::from_index(0));
        let slot0 = drv.submit(ClusterId::from_index(0), 0, paddr(1), 1, true).unwrap();
        let slot1 = drv.submit(ClusterId::from_index(0), 1, paddr(2), 1, true).unwrap();

        // Only slot1 is still pending; slot0's bit has cleared.
        let pending = 1u32 << slot1;
        let done = drv.scan_completions(ClusterId::from_index(0), pending);
        assert_eq!(done, alloc::vec![slot0]);

        // The freed slot is available for a new submission again.
        let reused = drv.submit(ClusterId::from_index(0), 2, paddr(3), 1, true).unwrap();
        assert_eq!(reused, slot0);
    }
}
