//! Locking primitives, from the single-processor `IrqMutex` up through the
//! mesh-wide hierarchical SQT lock and barrier (spec §4.7/§5).

pub mod barrier;
pub mod spinlock;
pub mod sqt;
pub mod ticket;

pub use barrier::Barrier;
pub use spinlock::{IrqMutex, IrqMutexGuard, TryLockError};
pub use sqt::SqtLock;
pub use ticket::TicketLock;

use crate::error::DriverError;

/// Polls `f` up to `attempts` times, sleeping a spin-loop hint between
/// tries, used by the drivers for back-to-back device register reads that
/// must not be reordered by an interrupt (spec §4.8-§4.10).
pub fn poll_with_retries<T>(attempts: usize, mut f: impl FnMut() -> Option<T>) -> Result<T, DriverError> {
    for _ in 0..attempts {
        if let Some(value) = f() {
            return Ok(value);
        }
        core::hint::spin_loop();
    }
    Err(DriverError::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_with_retries_succeeds_once_condition_is_true() {
        let mut count = 0;
        let result = poll_with_retries(10, || {
            count += 1;
            if count == 3 { Some(count) } else { None }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn poll_with_retries_times_out() {
        let result: Result<(), _> = poll_with_retries(5, || None);
        assert!(matches!(result, Err(DriverError::Timeout)));
    }
}
