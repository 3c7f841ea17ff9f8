//! Writable interrupt "mailboxes": per-processor registers a peripheral
//! writes to raise an interrupt on a chosen processor, rather than being
//! hard-wired to one (spec §4.6/§9). One mailbox kind services every
//! source; a data-word bit on the write forces an immediate context switch
//! instead of just flagging the interrupt pending (the open question spec
//! §9 raises, resolved this way per DESIGN.md).

use crate::config::IRQ_PER_PROC;
use crate::mapping::{IrqId, PeriphId, ProcId};

#[derive(Clone, Copy, Default)]
struct Slot {
    owner: Option<PeriphId>,
}

/// The `IRQ_PER_PROC` mailbox slots belonging to one processor.
pub struct MailboxBank {
    proc: ProcId,
    slots: [Slot; IRQ_PER_PROC],
}

/// Set on a mailbox write to request an immediate reschedule on the
/// target processor rather than merely latching the interrupt pending.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MailboxWrite {
    pub irq: IrqId,
    pub force_switch: bool,
}

impl MailboxBank {
    pub const fn new(proc: ProcId) -> Self {
        Self {
            proc,
            slots: [Slot { owner: None }; IRQ_PER_PROC],
        }
    }

    pub const fn proc(&self) -> ProcId {
        self.proc
    }

    /// Reserves the first free slot for `periph`, returning its `IrqId`
    /// within this bank's local numbering.
    pub fn alloc(&mut self, periph: PeriphId) -> Option<IrqId> {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.owner.is_none() {
                slot.owner = Some(periph);
                return Some(IrqId::from_index(i));
            }
        }
        None
    }

    pub fn release(&mut self, irq: IrqId) {
        self.slots[irq.index()].owner = None;
    }

    pub fn owner(&self, irq: IrqId) -> Option<PeriphId> {
        self.slots[irq.index()].owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_then_release_frees_the_slot_for_reuse() {
        let mut bank = MailboxBank::new(ProcId::from_index(0));
        let irq = bank.alloc(PeriphId::from_index(1)).unwrap();
        assert_eq!(bank.owner(irq), Some(PeriphId::from_index(1)));
        bank.release(irq);
        assert_eq!(bank.owner(irq), None);
        let irq2 = bank.alloc(PeriphId::from_index(2)).unwrap();
        assert_eq!(irq2, irq);
    }

    #[test]
    fn bank_exhausts_after_irq_per_proc_allocations() {
        let mut bank = MailboxBank::new(ProcId::from_index(0));
        for i in 0..IRQ_PER_PROC {
            assert!(bank.alloc(PeriphId::from_index(i)).is_some());
        }
        assert!(bank.alloc(PeriphId::from_index(999)).is_none());
    }
}
