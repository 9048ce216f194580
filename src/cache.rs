// Lookup cache - one {bin}.json file per identifier
//
// Cache entries hold the raw upstream payload verbatim. Writes are
// unconditional after a successful fetch; there is no expiry and no
// invalidation.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CacheStore { dir: dir.into() }
    }

    fn entry_path(&self, bin: &str) -> PathBuf {
        self.dir.join(format!("{}.json", bin))
    }

    /// Cached payload for a BIN, or `None` when no entry exists.
    pub fn get(&self, bin: &str) -> Result<Option<Value>> {
        let path = self.entry_path(bin);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read cache entry {:?}", path))?;
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("cache entry {:?} is not valid JSON", path))?;

        Ok(Some(value))
    }

    /// Persist a payload as the cache entry for a BIN.
    pub fn put(&self, bin: &str, payload: &Value) -> Result<()> {
        let path = self.entry_path(bin);
        let raw = serde_json::to_string(payload)?;
        fs::write(&path, raw).with_context(|| format!("failed to write cache entry {:?}", path))?;

        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_missing_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(tmp.path());

        assert!(cache.get("050840001234").unwrap().is_none());
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(tmp.path());

        let payload = json!({"name": "ТОО Ромашка", "okedName": "Разработка ПО"});
        cache.put("050840001234", &payload).unwrap();

        assert!(tmp.path().join("050840001234.json").exists());
        assert_eq!(cache.get("050840001234").unwrap(), Some(payload));
    }

    #[test]
    fn test_put_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(tmp.path());

        cache.put("1", &json!({"v": 1})).unwrap();
        cache.put("1", &json!({"v": 2})).unwrap();

        assert_eq!(cache.get("1").unwrap(), Some(json!({"v": 2})));
    }
}
