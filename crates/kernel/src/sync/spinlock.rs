//! A mutex that disables interrupts for the duration it is held, so an
//! interrupt handler on the same processor can never deadlock by trying to
//! retake a lock its own interruptee is holding. Lifted from the teacher's
//! `sync.rs` `IrqMutex`, generalized from `ArchTrait` calls to
//! [`crate::platform`].

use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use spin::mutex::{SpinMutex, SpinMutexGuard};
use thiserror::Error;

use crate::platform;

#[must_use = "interrupt status is restored when this is dropped"]
struct SavedInterruptStatus {
    enabled: bool,
    _marker: PhantomData<*const ()>,
}

impl SavedInterruptStatus {
    fn save() -> Self {
        Self {
            enabled: unsafe { platform::interrupts_enabled() },
            _marker: PhantomData,
        }
    }
}

impl Drop for SavedInterruptStatus {
    fn drop(&mut self) {
        unsafe {
            platform::set_interrupts_enabled(self.enabled);
        }
    }
}

#[derive(Debug, Error)]
#[error("mutex is already held")]
pub struct TryLockError;

/// A spinlock that disables interrupts while held and restores the prior
/// interrupt state on drop.
pub struct IrqMutex<T: ?Sized>(SpinMutex<T>);

impl<T> IrqMutex<T> {
    pub const fn new(value: T) -> Self {
        Self(SpinMutex::new(value))
    }
}

impl<T: ?Sized> IrqMutex<T> {
    pub fn get_mut(&mut self) -> &mut T {
        self.0.get_mut()
    }

    pub fn try_lock(&self) -> Result<IrqMutexGuard<'_, T>, TryLockError> {
        if self.0.is_locked() {
            Err(TryLockError)
        } else {
            Ok(self.lock())
        }
    }

    pub fn lock(&self) -> IrqMutexGuard<'_, T> {
        let saved_intr_status = SavedInterruptStatus::save();
        unsafe {
            platform::disable_interrupts();
        }

        let guard = self.0.lock();

        IrqMutexGuard {
            inner: ManuallyDrop::new(guard),
            saved_intr_status: ManuallyDrop::new(saved_intr_status),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.0.is_locked()
    }

    /// # Safety
    /// See [`spin::mutex::SpinMutex::force_unlock`].
    pub unsafe fn force_unlock(&self) {
        unsafe { self.0.force_unlock() };
    }
}

#[must_use = "mutex is unlocked and interrupt status restored when this is dropped"]
pub struct IrqMutexGuard<'a, T: ?Sized> {
    inner: ManuallyDrop<SpinMutexGuard<'a, T>>,
    saved_intr_status: ManuallyDrop<SavedInterruptStatus>,
}

impl<T: ?Sized> Drop for IrqMutexGuard<'_, T> {
    fn drop(&mut self) {
        unsafe {
            ManuallyDrop::drop(&mut self.inner);
            ManuallyDrop::drop(&mut self.saved_intr_status);
        }
    }
}

impl<T: ?Sized> Deref for IrqMutexGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized> DerefMut for IrqMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_excludes_try_lock() {
        let m = IrqMutex::new(0);
        let guard = m.lock();
        assert!(m.try_lock().is_err());
        drop(guard);
        assert!(m.try_lock().is_ok());
    }
}
