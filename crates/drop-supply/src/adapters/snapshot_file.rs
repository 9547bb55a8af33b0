//! File-backed snapshot store.
//!
//! The snapshot is written to `<file>.tmp` in the same directory, synced,
//! then renamed over the target, so a reader never sees a half-written
//! file and a failed write leaves the previous snapshot in place.

use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::{SnapshotStoreError, SupplySnapshot};
use crate::ports::SnapshotStore;

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "supply.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> SnapshotStoreError {
        SnapshotStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write_tmp(&self, tmp: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = File::create(tmp)?;
        file.write_all(contents)?;
        file.sync_all()
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Value>, SnapshotStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SnapshotStoreError::StaleSnapshotParse {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    fn store(&self, snapshot: &SupplySnapshot) -> Result<(), SnapshotStoreError> {
        let contents = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| SnapshotStoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let tmp = self.tmp_path();
        let written = self
            .write_tmp(&tmp, &contents)
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(&self.path, e));
        }
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SnapshotInfo;
    use serde_json::json;
    use tempfile::TempDir;

    fn snapshot(circulating: &str) -> SupplySnapshot {
        SupplySnapshot {
            symbol: "DROP".into(),
            decimals: 6,
            total_supply: "1000000.000000".into(),
            circulating_supply: circulating.into(),
            issued_supply: circulating.into(),
            excluded_accounts: vec![],
            issuer: "rszenFJoDdiGjyezQc8pME9KWDQH43Tswh".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
            info: SnapshotInfo {
                xrpscan: "https://xrpscan.com/account/rszenFJoDdiGjyezQc8pME9KWDQH43Tswh".into(),
            },
        }
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("docs/supply.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_store_creates_directories_and_pretty_prints() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs/supply.json");
        let store = FileSnapshotStore::new(&path);

        store.store(&snapshot("5.000000")).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n  \"symbol\": \"DROP\",\n  \"decimals\": 6,"));
        assert!(raw.ends_with("\n  }\n}"));
        assert_eq!(store.load().unwrap().unwrap()["circulating_supply"], json!("5.000000"));
        assert!(!dir.path().join("docs/supply.json.tmp").exists());
    }

    #[test]
    fn test_store_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("supply.json"));

        store.store(&snapshot("1.000000")).unwrap();
        store.store(&snapshot("2.000000")).unwrap();

        assert_eq!(store.load().unwrap().unwrap()["circulating_supply"], json!("2.000000"));
    }

    #[test]
    fn test_invalid_json_is_stale_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("supply.json");
        fs::write(&path, "{ truncated").unwrap();

        let err = FileSnapshotStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SnapshotStoreError::StaleSnapshotParse { .. }));
    }

    #[test]
    fn test_unwritable_target_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("docs");
        fs::write(&blocker, "not a directory").unwrap();

        let store = FileSnapshotStore::new(blocker.join("supply.json"));
        let err = store.store(&snapshot("1.000000")).unwrap_err();
        assert!(matches!(err, SnapshotStoreError::Io { .. }));
    }
}
