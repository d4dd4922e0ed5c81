//! Key/value persistence port for completion state.
//!
//! `MemoryKv` backs tests and throwaway sessions; `FileKv` keeps one JSON
//! object on disk so checkmarks survive across CLI invocations.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: BTreeMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A flat JSON object file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileKv {
    path: PathBuf,
}

impl FileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        if s.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&s).with_context(|| format!("parse {}", self.path.display()))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.read_all().unwrap_or_default();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_kv_round_trips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut kv = FileKv::new(&path);
        assert_eq!(kv.get("schedule_hash").unwrap(), None);

        kv.set("schedule_hash", "a_1|a_2").unwrap();
        kv.set("schedule_date", "2026-03-02").unwrap();

        let reopened = FileKv::new(&path);
        assert_eq!(reopened.get("schedule_hash").unwrap().as_deref(), Some("a_1|a_2"));

        kv.remove("schedule_hash").unwrap();
        assert_eq!(reopened.get("schedule_hash").unwrap(), None);
        assert_eq!(reopened.get("schedule_date").unwrap().as_deref(), Some("2026-03-02"));
    }

    #[test]
    fn corrupt_file_errors_on_read_but_is_overwritten_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let mut kv = FileKv::new(&path);
        assert!(kv.get("schedule_hash").is_err());

        kv.set("schedule_hash", "x_0").unwrap();
        assert_eq!(kv.get("schedule_hash").unwrap().as_deref(), Some("x_0"));
    }

    #[test]
    fn memory_kv_basic() {
        let mut kv = MemoryKv::new();
        kv.set("k", "v").unwrap();
        assert_eq!(kv.len(), 1);
        kv.remove("k").unwrap();
        assert!(kv.is_empty());
    }
}
