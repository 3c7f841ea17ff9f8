//! Fixed dispatch table indexed by call number, the same "bounded table of
//! handler pointers" shape the trap vector itself uses (spec §4.6/§6).

use crate::config::{MAX_P, MAX_Y};
use crate::mapping::{ProcId, TaskId};

use super::errno::Errno;

pub type SyscallHandler = fn(caller: TaskId, args: [usize; 4]) -> Result<isize, Errno>;

/// Number of entries in the syscall table; spec §6's closed call list
/// fits comfortably under this.
pub const SYSCALL_COUNT: usize = 16;

pub struct SyscallTable {
    handlers: [Option<SyscallHandler>; SYSCALL_COUNT],
}

impl SyscallTable {
    pub const fn new() -> Self {
        Self { handlers: [None; SYSCALL_COUNT] }
    }

    pub fn register(&mut self, number: usize, handler: SyscallHandler) {
        self.handlers[number] = Some(handler);
    }

    /// Dispatches `number`; an out-of-range or unregistered number is
    /// `Errno::NoSys`, never a panic or a silent no-op.
    pub fn dispatch(&self, number: usize, caller: TaskId, args: [usize; 4]) -> Result<isize, Errno> {
        self.handlers
            .get(number)
            .and_then(|slot| *slot)
            .ok_or(Errno::NoSys)
            .and_then(|handler| handler(caller, args))
    }
}

impl Default for SyscallTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Decomposes a global processor id back into `(x, y, p)`, the inverse of
/// the coordinate packing in spec §3. Ambient bookkeeping, not a new
/// syscall number (SPEC_FULL.md §6).
pub fn proc_xyp(proc: ProcId) -> (u32, u32, u32) {
    let global = proc.index() as u32;
    let p = global % (MAX_P as u32);
    let cluster = global / (MAX_P as u32);
    let y = cluster % (MAX_Y as u32);
    let x = cluster / (MAX_Y as u32);
    (x, y, p)
}

/// Reports which processor a task's scheduler entry currently calls home,
/// for diagnostics. Also ambient, not a syscall number.
pub fn affinity(home: ProcId) -> (u32, u32, u32) {
    proc_xyp(home)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_handler(_caller: TaskId, args: [usize; 4]) -> Result<isize, Errno> {
        Ok(args[0] as isize)
    }

    #[test]
    fn dispatch_runs_the_registered_handler() {
        let mut table = SyscallTable::new();
        table.register(2, ok_handler);
        let result = table.dispatch(2, TaskId::from_index(0), [42, 0, 0, 0]).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn unregistered_number_is_nosys() {
        let table = SyscallTable::new();
        assert_eq!(table.dispatch(5, TaskId::from_index(0), [0; 4]), Err(Errno::NoSys));
    }

    #[test]
    fn out_of_range_number_is_nosys() {
        let table = SyscallTable::new();
        assert_eq!(table.dispatch(999, TaskId::from_index(0), [0; 4]), Err(Errno::NoSys));
    }

    #[test]
    fn proc_xyp_inverts_the_packing() {
        let global = (3 * MAX_Y as u32 + 2) * MAX_P as u32 + 1;
        assert_eq!(proc_xyp(ProcId::from_index(global as usize)), (3, 2, 1));
    }
}
