use std::sync::{Condvar, Mutex, PoisonError};
use tracing::trace;

/// Bounds how many alignments run at the same time across the whole process.
///
/// A slot is held by the [`Permit`] returned from [`AdmissionGate::acquire`]
/// and given back when the permit is dropped, including during unwinding.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    in_use: Mutex<usize>,
    released: Condvar,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `capacity` holders (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            in_use: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        *self.in_use.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until a slot is free and takes it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut in_use = self.in_use.lock().unwrap_or_else(PoisonError::into_inner);
        while *in_use >= self.capacity {
            in_use = self
                .released
                .wait(in_use)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *in_use += 1;
        trace!(in_use = *in_use, capacity = self.capacity, "Admission slot taken");
        Permit { gate: self }
    }

    fn release(&self) {
        let mut in_use = self.in_use.lock().unwrap_or_else(PoisonError::into_inner);
        *in_use = in_use.saturating_sub(1);
        self.released.notify_one();
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
