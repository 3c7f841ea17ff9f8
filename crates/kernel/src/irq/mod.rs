//! Interrupt demultiplexing: writable per-processor mailboxes, the handler
//! table each one dispatches through, and the trap-vector/outcome taxonomy
//! the trap entry consults (spec §4.6).

pub mod demux;
pub mod mailbox;
pub mod vector;

pub use demux::{Demux, IrqHandler};
pub use mailbox::{MailboxBank, MailboxWrite};
pub use vector::{TrapOutcome, Vector};
