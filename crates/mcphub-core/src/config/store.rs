//! Config store for loading and saving `.mcphub.json`.
//!
//! Every mutation is persisted immediately. Writes go to a temp file in the
//! same directory which is then renamed over the target, so readers never
//! observe a half-written file. No cross-process lock is taken: concurrent
//! writers race and the last rename wins.

use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::parser::{self, StoreDocument};
use super::paths;
use super::schema::ServerOverride;
use crate::error::{Error, Result};

/// Outcome of [`ConfigStore::init`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub path: PathBuf,
    /// False when a store already existed
    pub created: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    /// Servers plus root members outside them, preserved across saves
    document: StoreDocument,
}

impl ConfigStore {
    /// Locate the store from the current directory and load it.
    pub fn discover() -> Result<Self> {
        let path = paths::locate()?;
        Self::open(path)
    }

    /// Load the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = parser::parse_store_document(&path)?;
        tracing::debug!(
            path = %path.display(),
            count = document.servers.len(),
            "loaded store"
        );
        Ok(Self { path, document })
    }

    /// Create an empty store in `dir` unless one is already there.
    pub fn init(dir: &Path) -> Result<InitReport> {
        let path = paths::store_path_in(dir);
        if path.exists() {
            return Ok(InitReport {
                path,
                created: false,
            });
        }

        let store = Self {
            path: path.clone(),
            document: StoreDocument::default(),
        };
        store.save()?;
        tracing::info!(path = %path.display(), "created store");

        Ok(InitReport {
            path,
            created: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, alias: &str) -> Option<&ServerOverride> {
        self.document.servers.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.document.servers.contains_key(alias)
    }

    pub fn servers(&self) -> &IndexMap<String, ServerOverride> {
        &self.document.servers
    }

    /// Aliases in insertion order.
    pub fn list(&self) -> Vec<&str> {
        self.document.servers.keys().map(String::as_str).collect()
    }

    /// Insert or replace an alias and persist.
    ///
    /// Returns whether the store changed. Re-adding identical content is a
    /// no-op; conflicting content requires `overwrite`.
    pub fn add(
        &mut self,
        alias: &str,
        server: ServerOverride,
        overwrite: bool,
    ) -> Result<bool> {
        match self.document.servers.get(alias) {
            Some(existing) if *existing == server => {
                tracing::debug!(alias, "alias already configured with identical content");
                return Ok(false);
            }
            Some(_) if !overwrite => {
                return Err(Error::DuplicateAlias {
                    alias: alias.to_string(),
                });
            }
            _ => {}
        }

        let previous = self.document.servers.insert(alias.to_string(), server);
        if let Err(err) = self.save() {
            match previous {
                Some(previous) => {
                    self.document.servers.insert(alias.to_string(), previous);
                }
                None => {
                    self.document.servers.shift_remove(alias);
                }
            }
            return Err(err);
        }

        tracing::info!(alias, path = %self.path.display(), "saved server alias");
        Ok(true)
    }

    /// Remove an alias and persist.
    ///
    /// Returns `None` when the alias was not configured; nothing is written.
    pub fn remove(&mut self, alias: &str) -> Result<Option<ServerOverride>> {
        let Some(index) = self.document.servers.get_index_of(alias) else {
            return Ok(None);
        };
        let removed = self.document.servers.shift_remove(alias);

        if let Err(err) = self.save() {
            if let Some(server) = removed {
                self.document.servers.shift_insert(index, alias.to_string(), server);
            }
            return Err(err);
        }

        tracing::info!(alias, path = %self.path.display(), "removed server alias");
        Ok(removed)
    }

    fn save(&self) -> Result<()> {
        let content = self.document.to_json()?;
        write_atomic(&self.path, content.as_bytes())
    }
}

/// Write `bytes` to a sibling temp file and rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let tmp = unique_temp_path(path)?;
    let written = std::fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::io(&tmp, err));
    }

    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::io(path, err));
    }
    Ok(())
}

fn unique_temp_path(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let base = path.file_name().ok_or_else(|| {
        Error::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    for attempt in 0u32..1000 {
        let name = if attempt == 0 {
            format!(".{}.tmp.{}", base.to_string_lossy(), std::process::id())
        } else {
            format!(
                ".{}.tmp.{}.{}",
                base.to_string_lossy(),
                std::process::id(),
                attempt
            )
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(Error::io(
        path,
        std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "failed to allocate a unique temp path",
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_store(temp: &TempDir) -> ConfigStore {
        let report = ConfigStore::init(temp.path()).unwrap();
        ConfigStore::open(report.path).unwrap()
    }

    #[test]
    fn init_creates_then_noops() {
        let temp = TempDir::new().unwrap();

        let first = ConfigStore::init(temp.path()).unwrap();
        assert!(first.created);
        assert_eq!(first.path, temp.path().join(paths::STORE_FILE_NAME));

        std::fs::write(&first.path, r#"{"mcpServers": {"keep": {"name": "x"}}}"#).unwrap();
        let second = ConfigStore::init(temp.path()).unwrap();
        assert!(!second.created);

        let store = ConfigStore::open(&second.path).unwrap();
        assert!(store.contains("keep"));
    }

    #[test]
    fn add_persists_immediately() {
        let temp = TempDir::new().unwrap();
        let mut store = new_store(&temp);

        let changed = store
            .add("mytool", ServerOverride::package("acme/tool"), false)
            .unwrap();
        assert!(changed);

        let reloaded = ConfigStore::open(store.path()).unwrap();
        assert_eq!(
            reloaded.get("mytool").unwrap().package_id.as_deref(),
            Some("acme/tool")
        );
    }

    #[test]
    fn identical_add_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut store = new_store(&temp);
        let entry = ServerOverride::package("acme/tool").with_env("TOKEN", "abc");

        assert!(store.add("mytool", entry.clone(), false).unwrap());

        // Compact layout that a save would reformat.
        let compact = r#"{"mcpServers":{"mytool":{"package_id":"acme/tool","env":{"TOKEN":"abc"}}}}"#;
        std::fs::write(store.path(), compact).unwrap();
        let mut store = ConfigStore::open(store.path()).unwrap();

        assert!(!store.add("mytool", entry, false).unwrap());
        assert_eq!(store.list(), vec!["mytool"]);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), compact);
    }

    #[test]
    fn save_keeps_unrecognized_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(paths::STORE_FILE_NAME);
        std::fs::write(
            &path,
            r#"{
  "mcpServers": {"a": {"package_id": "acme/tool", "disabled": true}},
  "legacy": {"name": "old/tool"},
  "version": 2
}"#,
        )
        .unwrap();

        let mut store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.list(), vec!["a"]);
        store.add("b", ServerOverride::package("other/tool"), false).unwrap();
        store.remove("b").unwrap();
        store.add("c", ServerOverride::package("third/tool"), false).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["legacy"], serde_json::json!({"name": "old/tool"}));
        assert_eq!(value["version"], 2);
        assert_eq!(value["mcpServers"]["a"]["disabled"], true);
        assert_eq!(value["mcpServers"]["c"]["package_id"], "third/tool");

        let reloaded = ConfigStore::open(&path).unwrap();
        assert_eq!(reloaded.list(), vec!["a", "c"]);
        assert_eq!(
            reloaded.get("a").unwrap().extra["disabled"],
            serde_json::json!(true)
        );
    }

    #[test]
    fn conflicting_add_requires_overwrite() {
        let temp = TempDir::new().unwrap();
        let mut store = new_store(&temp);

        store
            .add("mytool", ServerOverride::package("acme/tool"), false)
            .unwrap();
        let err = store
            .add("mytool", ServerOverride::package("other/tool"), false)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAlias { ref alias } if alias == "mytool"));
        assert_eq!(
            store.get("mytool").unwrap().package_id.as_deref(),
            Some("acme/tool")
        );

        assert!(
            store
                .add("mytool", ServerOverride::package("other/tool"), true)
                .unwrap()
        );
        let reloaded = ConfigStore::open(store.path()).unwrap();
        assert_eq!(
            reloaded.get("mytool").unwrap().package_id.as_deref(),
            Some("other/tool")
        );
    }

    #[test]
    fn overwrite_keeps_position() {
        let temp = TempDir::new().unwrap();
        let mut store = new_store(&temp);

        store.add("a", ServerOverride::package("a"), false).unwrap();
        store.add("b", ServerOverride::package("b"), false).unwrap();
        store.add("a", ServerOverride::package("a2"), true).unwrap();

        assert_eq!(store.list(), vec!["a", "b"]);
    }

    #[test]
    fn remove_present_and_absent() {
        let temp = TempDir::new().unwrap();
        let mut store = new_store(&temp);
        store
            .add("mytool", ServerOverride::package("acme/tool"), false)
            .unwrap();

        let removed = store.remove("mytool").unwrap();
        assert_eq!(removed, Some(ServerOverride::package("acme/tool")));
        assert!(store.remove("mytool").unwrap().is_none());

        let reloaded = ConfigStore::open(store.path()).unwrap();
        assert!(reloaded.list().is_empty());
    }

    #[test]
    fn list_keeps_insertion_order() {
        let temp = TempDir::new().unwrap();
        let mut store = new_store(&temp);
        for alias in ["zeta", "alpha", "mid"] {
            store
                .add(alias, ServerOverride::package(alias), false)
                .unwrap();
        }

        assert_eq!(store.list(), vec!["zeta", "alpha", "mid"]);
        let reloaded = ConfigStore::open(store.path()).unwrap();
        assert_eq!(reloaded.list(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let mut store = new_store(&temp);
        store
            .add("mytool", ServerOverride::package("acme/tool"), false)
            .unwrap();

        let names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![paths::STORE_FILE_NAME.to_string()]);
    }
}
