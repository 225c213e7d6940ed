use parking_lot::Mutex;
use parking_lot::MutexGuard;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Property names chosen by earlier runs, so separately mangled files agree on them. Stored as JSON: `{"props": {"original": "mangled"}}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameCache {
  pub props: BTreeMap<String, String>,
}

impl NameCache {
  pub fn from_json(json: &str) -> serde_json::Result<NameCache> {
    serde_json::from_str(json)
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  /// Reads a cache file. A missing file is an empty cache.
  pub fn load(path: impl AsRef<Path>) -> io::Result<NameCache> {
    let raw = match fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(NameCache::default()),
      Err(err) => return Err(err),
    };
    Ok(NameCache::from_json(&raw)?)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, self.to_json()?)
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.props.get(name).map(String::as_str)
  }

  pub fn insert(&mut self, name: &str, mangled: &str) {
    self.props.insert(name.to_string(), mangled.to_string());
  }

  /// All mangled names, which new names must avoid.
  pub fn outputs(&self) -> BTreeSet<&str> {
    self.props.values().map(String::as_str).collect()
  }
}

/// A [`NameCache`] shared between threads mangling different files.
#[derive(Clone, Debug, Default)]
pub struct SharedNameCache(Arc<Mutex<NameCache>>);

impl SharedNameCache {
  pub fn new(cache: NameCache) -> SharedNameCache {
    SharedNameCache(Arc::new(Mutex::new(cache)))
  }

  pub fn lock(&self) -> MutexGuard<'_, NameCache> {
    self.0.lock()
  }

  pub fn snapshot(&self) -> NameCache {
    self.0.lock().clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_shape() {
    let mut cache = NameCache::default();
    cache.insert("foo", "a");
    let json = cache.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value, serde_json::json!({ "props": { "foo": "a" } }));
    assert_eq!(NameCache::from_json(&json).unwrap(), cache);
    assert_eq!(NameCache::from_json("{}").unwrap(), NameCache::default());
  }

  #[test]
  fn load_and_save() {
    let path = std::env::temp_dir().join(format!("symbol-js-cache-{}.json", std::process::id()));
    let _ = fs::remove_file(&path);
    assert_eq!(NameCache::load(&path).unwrap(), NameCache::default());
    let mut cache = NameCache::default();
    cache.insert("bar", "b");
    cache.save(&path).unwrap();
    assert_eq!(NameCache::load(&path).unwrap().get("bar"), Some("b"));
    fs::remove_file(&path).unwrap();
  }

  #[test]
  fn shared_between_threads() {
    let shared = SharedNameCache::default();
    let handles: Vec<_> = (0..4)
      .map(|i| {
        let shared = shared.clone();
        std::thread::spawn(move || {
          shared.lock().insert(&format!("p{}", i), &format!("m{}", i));
        })
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }
    let snapshot = shared.snapshot();
    assert_eq!(snapshot.props.len(), 4);
    assert_eq!(snapshot.outputs().len(), 4);
  }
}
