//! Routes a raised mailbox interrupt on a processor to the handler
//! registered for it: a bounded table of handler closures indexed by
//! `(proc, irq)`, mirroring the teacher's `IrqChipDescriptor` table of
//! boxed handlers (`irq.rs`) generalized from one global vector to one
//! table per processor.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::config::IRQ_PER_PROC;
use crate::mapping::{IrqId, ProcId};

use super::mailbox::MailboxBank;

pub trait IrqHandler: Send {
    fn handle(&mut self, irq: IrqId);
}

impl<F: FnMut(IrqId) + Send> IrqHandler for F {
    fn handle(&mut self, irq: IrqId) {
        (self)(irq)
    }
}

struct ProcTable {
    bank: MailboxBank,
    handlers: Box<[Option<Box<dyn IrqHandler>>; IRQ_PER_PROC]>,
}

/// The mesh-wide interrupt demultiplexer: one mailbox bank and handler
/// table per processor.
pub struct Demux {
    procs: Vec<ProcTable>,
}

impl Demux {
    pub fn new(proc_count: usize) -> Self {
        let procs = (0..proc_count)
            .map(|i| ProcTable {
                bank: MailboxBank::new(ProcId::from_index(i)),
                handlers: Box::new([const { None }; IRQ_PER_PROC]),
            })
            .collect();
        Self { procs }
    }

    /// Registers `handler` for the next free mailbox slot on `proc`.
    pub fn register(
        &mut self,
        proc: ProcId,
        periph: crate::mapping::PeriphId,
        handler: impl IrqHandler + 'static,
    ) -> Option<IrqId> {
        let table = &mut self.procs[proc.index()];
        let irq = table.bank.alloc(periph)?;
        table.handlers[irq.index()] = Some(Box::new(handler));
        Some(irq)
    }

    pub fn unregister(&mut self, proc: ProcId, irq: IrqId) {
        let table = &mut self.procs[proc.index()];
        table.handlers[irq.index()] = None;
        table.bank.release(irq);
    }

    /// Dispatches a raised interrupt to its registered handler, if any.
    /// Returns whether a handler ran (an unregistered mailbox firing is a
    /// routing bug upstream, not this function's problem to fix).
    pub fn dispatch(&mut self, proc: ProcId, irq: IrqId) -> bool {
        let table = &mut self.procs[proc.index()];
        if let Some(handler) = table.handlers[irq.index()].as_mut() {
            handler.handle(irq);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dispatch_invokes_the_registered_handler() {
        static HITS: AtomicUsize = AtomicUsize::new(0);
        let mut demux = Demux::new(2);
        let irq = demux
            .register(ProcId::from_index(0), crate::mapping::PeriphId::from_index(0), |_irq: IrqId| {
                HITS.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert!(demux.dispatch(ProcId::from_index(0), irq));
        assert_eq!(HITS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn dispatch_to_unregistered_irq_is_a_no_op() {
        let mut demux = Demux::new(1);
        assert!(!demux.dispatch(ProcId::from_index(0), IrqId::from_index(3)));
    }
}
