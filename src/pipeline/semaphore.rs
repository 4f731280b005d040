//! Counting semaphore bounding concurrently open files, independent of the worker count.

use crossbeam_channel::{Receiver, Sender, bounded};

/// A bounded channel used as a token bucket: acquiring sends a token (blocks when full),
/// releasing receives one back.
pub struct FdSemaphore {
    tx: Sender<()>,
    rx: Receiver<()>,
    capacity: usize,
}

/// Held while a worker has a file open. Dropping it frees the slot.
pub struct FdPermit<'a> {
    sem: &'a FdSemaphore,
}

impl FdSemaphore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Block until a slot is free.
    pub fn acquire(&self) -> FdPermit<'_> {
        // Both ends live in `self`, so the channel can never be disconnected here.
        let _ = self.tx.send(());
        FdPermit { sem: self }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn in_use(&self) -> usize {
        self.rx.len()
    }
}

impl Drop for FdPermit<'_> {
    fn drop(&mut self) {
        let _ = self.sem.rx.recv();
    }
}
