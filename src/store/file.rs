use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{PreferenceStore, SecretStore};
use crate::error::{ClientError, ClientResult};

/// Flat JSON object on disk (`{"accessToken": "...", ...}`).
///
/// Every mutation rewrites the whole file through a sibling temp file and a rename,
/// so a crash never leaves half a token pair behind. On unix the file is created 0600.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn read_map(&self) -> ClientResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::store(format!("read {}: {}", self.path.display(), e)))?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text)
            .map_err(|e| ClientError::store(format!("corrupt store {}: {}", self.path.display(), e)))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ClientError::store(format!("create {}: {}", parent.display(), e)))?;
            }
        }
        let body = serde_json::to_string_pretty(map)
            .map_err(|e| ClientError::store(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&tmp)
            .map_err(|e| ClientError::store(format!("create {}: {}", tmp.display(), e)))?;
        // a temp file left over from an earlier crash keeps its old mode
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| ClientError::store(format!("chmod {}: {}", tmp.display(), e)))?;
        }
        file.write_all(body.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| ClientError::store(format!("write {}: {}", tmp.display(), e)))?;
        drop(file);
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| ClientError::store(format!("rename into {}: {}", self.path.display(), e)))
    }

    fn update<F: FnOnce(&mut BTreeMap<String, String>)>(&self, f: F) -> ClientResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        f(&mut map);
        self.write_map(&map)
    }

    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.get(key).cloned())
    }
}

impl SecretStore for JsonFileStore {
    fn get_secret(&self, key: &str) -> ClientResult<Option<String>> { self.get(key) }

    fn set_secret(&self, key: &str, value: &str) -> ClientResult<()> {
        self.update(|m| { m.insert(key.to_string(), value.to_string()); })
    }

    fn delete_secret(&self, key: &str) -> ClientResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|m| { m.remove(key); })
    }

    fn set_secrets(&self, entries: &[(&str, &str)]) -> ClientResult<()> {
        self.update(|m| {
            for (k, v) in entries {
                m.insert(k.to_string(), v.to_string());
            }
        })
    }
}

impl PreferenceStore for JsonFileStore {
    fn get_preference(&self, key: &str) -> ClientResult<Option<String>> { self.get(key) }

    fn set_preference(&self, key: &str, value: &str) -> ClientResult<()> {
        self.set_secret(key, value)
    }

    fn remove_preference(&self, key: &str) -> ClientResult<()> {
        self.delete_secret(key)
    }
}
