//! The set of words the learner marked as hard, and where it is persisted.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use tracing::warn;

use crate::error::Result;
use crate::model::{Part, Word};

pub const HARD_WORDS_KEY: &str = "linguaFlowHardWords";

/// String key/value persistence, in the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Keeps every key in a single JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut all = self.read_all().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "overwriting unreadable store file");
            BTreeMap::new()
        });
        all.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Hard-word identifiers, written back to the store on every change.
pub struct HardWords<S: KeyValueStore> {
    ids: BTreeSet<String>,
    store: S,
}

impl<S: KeyValueStore> HardWords<S> {
    /// Loads the saved set. Anything unreadable starts an empty set.
    pub fn load(store: S) -> Self {
        let ids = match store.get(HARD_WORDS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring unreadable hard word list");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read hard word list");
                Vec::new()
            }
        };

        Self {
            ids: ids.into_iter().collect(),
            store,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flips the mark on `id` and persists. Returns whether it is now hard.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let now_hard = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };
        self.save()?;
        Ok(now_hard)
    }

    /// Hard words across all parts, in part then sheet order.
    pub fn collect<'a>(&self, parts: &'a [Part]) -> Vec<&'a Word> {
        parts
            .iter()
            .flat_map(|p| &p.words)
            .filter(|w| self.contains(&w.id))
            .collect()
    }

    fn save(&self) -> Result<()> {
        let ids: Vec<&String> = self.ids.iter().collect();
        self.store
            .set(HARD_WORDS_KEY, &serde_json::to_string(&ids)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_words;
    use tempfile::tempdir;

    #[test]
    fn toggle_persists_each_change() {
        let mut hard = HardWords::load(MemoryStore::default());
        assert!(hard.toggle("P-1-0").unwrap());
        assert!(hard.toggle("P-2-0").unwrap());
        assert!(!hard.toggle("P-1-0").unwrap());

        let raw = hard.store.get(HARD_WORDS_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"["P-2-0"]"#);
    }

    #[test]
    fn corrupt_value_loads_empty() {
        let store = MemoryStore::default();
        store.set(HARD_WORDS_KEY, "not a list").unwrap();
        assert!(HardWords::load(store).is_empty());
    }

    #[test]
    fn file_store_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("hard_words.json");

        let mut hard = HardWords::load(JsonFileStore::new(&path));
        hard.toggle("PART 1-3-0").unwrap();
        drop(hard);

        let hard = HardWords::load(JsonFileStore::new(&path));
        assert!(hard.contains("PART 1-3-0"));
        assert_eq!(hard.len(), 1);
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        store.set("theme", "dark").unwrap();
        store.set(HARD_WORDS_KEY, "[]").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_replaces_corrupt_file_on_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{broken").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.get(HARD_WORDS_KEY).is_err());
        store.set(HARD_WORDS_KEY, r#"["P-1-0"]"#).unwrap();
        assert_eq!(
            store.get(HARD_WORDS_KEY).unwrap().as_deref(),
            Some(r#"["P-1-0"]"#)
        );
    }

    #[test]
    fn collect_follows_part_order() {
        let parts = parse_words("A,A,B,B\none,bir,two,iki\nthree,uc,four,dort");
        let mut hard = HardWords::load(MemoryStore::default());
        hard.toggle("B-1-2").unwrap();
        hard.toggle("A-2-0").unwrap();
        hard.toggle("gone-9-0").unwrap();

        let words: Vec<_> = hard
            .collect(&parts)
            .iter()
            .map(|w| w.source_text.as_str())
            .collect();
        assert_eq!(words, ["three", "two"]);
    }
}
