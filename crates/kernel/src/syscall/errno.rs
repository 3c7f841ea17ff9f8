//! The error codes a syscall can return to userspace.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum Errno {
    /// Syscall number not in the table (spec §6: unknown numbers error).
    NoSys = 1,
    /// Argument out of range or otherwise malformed.
    Inval = 2,
    /// Permission denied by the calling thread's vseg access mode.
    Perm = 3,
    /// Target resource does not exist.
    NoEnt = 4,
    /// Resource temporarily unavailable (would block in a mode that
    /// disallows blocking).
    Again = 5,
}
