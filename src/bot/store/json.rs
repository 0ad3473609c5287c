use std::fs;
use std::path::PathBuf;

use super::{models::Snapshot, Storage, StoreError};

/* JSON file backend.
 * The snapshot is read and written wholesale as one pretty-printed
 * JSON document. A missing file reads as the empty snapshot, so the
 * first run starts from defaults.
 */

pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> JsonFile {
        JsonFile { path: path.into() }
    }
}

impl Storage for JsonFile {
    fn read(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
