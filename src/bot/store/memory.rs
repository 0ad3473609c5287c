use std::sync::Mutex;

use super::{models::Snapshot, Storage, StoreError};

// In-memory backend. Used by the core tests, and handy for running the
// bot without durability.
#[derive(Default)]
pub struct Memory {
    snapshot: Mutex<Snapshot>,
}

impl Storage for Memory {
    fn read(&self) -> Result<Snapshot, StoreError> {
        let guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn write(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot.clone();
        Ok(())
    }
}
