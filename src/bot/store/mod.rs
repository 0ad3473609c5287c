// Exported structs and types
pub use self::json::JsonFile;
pub use self::memory::Memory;
pub use self::models::{Role, Snapshot, User, DEFAULT_COINS};

// Submodules
mod json;
mod memory;
mod models;

use std::sync::{Mutex, MutexGuard};

/* Store
 * Store is the single owned handle to the persisted state.
 * No other module touches the snapshot or the backend directly;
 * everything goes through view (read-only) and apply (read-modify-
 * write-persist under one lock), which keeps mutation serialized and
 * persistence-on-write in one place.
 */

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(std::io::Error),
    #[error("Store serialization error: {0}")]
    Json(serde_json::Error),
}

// Implement the From trait to convert from io::Error to StoreError
impl From<std::io::Error> for StoreError {
    fn from(io_error: std::io::Error) -> StoreError {
        StoreError::Io(io_error)
    }
}

// Implement the From trait to convert from serde_json::Error to StoreError
impl From<serde_json::Error> for StoreError {
    fn from(json_error: serde_json::Error) -> StoreError {
        StoreError::Json(json_error)
    }
}

// The persistence boundary: one whole-snapshot read, one whole-snapshot
// write.
pub trait Storage: Send + Sync {
    fn read(&self) -> Result<Snapshot, StoreError>;
    fn write(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

pub struct Store {
    snapshot: Mutex<Snapshot>,
    backend: Box<dyn Storage>,
}

impl Store {
    /* Reads the snapshot from the backend and writes it straight back,
     * so a fresh deployment persists its empty state on startup.
     */
    pub fn open(backend: impl Storage + 'static) -> Result<Store, StoreError> {
        let snapshot = backend.read()?;
        backend.write(&snapshot)?;
        Ok(Store {
            snapshot: Mutex::new(snapshot),
            backend: Box::new(backend),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Runs a read-only closure against the current snapshot.
    pub fn view<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        f(&self.lock())
    }

    /* Runs a mutating closure as one critical section.
     * The closure reports whether it actually changed anything; only
     * then is the snapshot persisted, before the lock is released.
     * A failed write surfaces here and the closure's result is
     * discarded by the caller, so no reply ever claims an unpersisted
     * mutation succeeded.
     */
    pub fn apply<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> (T, bool),
    ) -> Result<T, StoreError> {
        let mut guard = self.lock();
        let (result, dirty) = f(&mut guard);
        if dirty {
            self.backend.write(&guard)?;
        }
        Ok(result)
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::{Memory, Role, Storage, Store};

    #[test]
    fn test_apply_persists_only_when_dirty() {
        let store = Store::open(Memory::default()).unwrap();

        store
            .apply(|snapshot| {
                snapshot.ensure_user("U1").role = Role::Deputy;
                ((), true)
            })
            .unwrap();
        store
            .apply(|snapshot| {
                snapshot.ensure_user("U1").role = Role::Owner;
                ((), false)
            })
            .unwrap();

        // The backend saw the deputy write but not the undirtied one.
        let persisted = store.backend.read().unwrap();
        assert_eq!(persisted.user("U1").unwrap().role, Role::Deputy);

        // The in-memory snapshot has the latest state regardless.
        assert_eq!(store.view(|s| s.user("U1").unwrap().role), Role::Owner);
    }

    #[test]
    fn test_open_loads_existing_snapshot() {
        let backend = Memory::default();
        let mut snapshot = super::Snapshot::default();
        snapshot.ensure_user("U9").coins = 3;
        backend.write(&snapshot).unwrap();

        let store = Store::open(backend).unwrap();
        assert_eq!(store.view(|s| s.user("U9").unwrap().coins), 3);
    }
}
