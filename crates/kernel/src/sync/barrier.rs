//! A sense-reversing barrier used between boot phases: every participant
//! blocks in `wait()` until the last one arrives, so no cluster proceeds to
//! phase N+1 while another is still mutating phase-N state (spec §4.11).

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct Barrier {
    participants: usize,
    count: AtomicUsize,
    sense: AtomicBool,
}

impl Barrier {
    pub const fn new(participants: usize) -> Self {
        Self {
            participants,
            count: AtomicUsize::new(0),
            sense: AtomicBool::new(false),
        }
    }

    /// Blocks until `participants` callers have reached this point.
    pub fn wait(&self) {
        let local_sense = !self.sense.load(Ordering::Relaxed);
        if self.count.fetch_add(1, Ordering::AcqRel) + 1 == self.participants {
            self.count.store(0, Ordering::Relaxed);
            self.sense.store(local_sense, Ordering::Release);
        } else {
            while self.sense.load(Ordering::Acquire) != local_sense {
                core::hint::spin_loop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_participant_passes_immediately() {
        let barrier = Barrier::new(1);
        barrier.wait();
        barrier.wait();
    }

    #[test]
    fn second_phase_requires_a_fresh_arrival_count() {
        let barrier = Barrier::new(2);
        barrier.wait();
        assert_eq!(barrier.count.load(Ordering::Relaxed), 1);
        barrier.wait();
        assert_eq!(barrier.count.load(Ordering::Relaxed), 0);
    }
}
