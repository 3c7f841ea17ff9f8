//! Hierarchical "square-tree" lock: contention from within one cluster is
//! absorbed by a per-cluster gate before a single representative ever
//! touches the mesh-wide lock, keeping cache-coherence traffic local to the
//! contending cluster (spec §4.7/§9's locality note).

use crate::mapping::ClusterId;

use super::spinlock::{IrqMutex, IrqMutexGuard};

/// A lock over `T`, fronted by `CLUSTERS` per-cluster gates.
pub struct SqtLock<T, const CLUSTERS: usize> {
    local: [IrqMutex<()>; CLUSTERS],
    global: IrqMutex<T>,
}

impl<T, const CLUSTERS: usize> SqtLock<T, CLUSTERS> {
    pub const fn new(value: T) -> Self {
        Self {
            local: [const { IrqMutex::new(()) }; CLUSTERS],
            global: IrqMutex::new(value),
        }
    }

    /// Acquires the lock on behalf of `cluster`: takes that cluster's local
    /// gate first, then the shared value lock, holding both for the
    /// guard's lifetime.
    pub fn lock(&self, cluster: ClusterId) -> SqtGuard<'_, T> {
        let local = self.local[cluster.index()].lock();
        let global = self.global.lock();
        SqtGuard { _local: local, global }
    }
}

pub struct SqtGuard<'a, T> {
    _local: IrqMutexGuard<'a, ()>,
    global: IrqMutexGuard<'a, T>,
}

impl<T> core::ops::Deref for SqtGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.global
    }
}

impl<T> core::ops::DerefMut for SqtGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_clusters_both_reach_the_shared_value() {
        let lock: SqtLock<u32, 4> = SqtLock::new(0);
        {
            let mut g = lock.lock(ClusterId::from_index(0));
            *g += 1;
        }
        {
            let mut g = lock.lock(ClusterId::from_index(2));
            *g += 1;
        }
        assert_eq!(*lock.lock(ClusterId::from_index(1)), 2);
    }
}
