use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub trait CacheStore {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, name: &str, bytes: &[u8]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn invalidate(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Some(bytes))
    }

    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(name);
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(name).cloned())
    }

    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(name)
    }

    fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        (**self).put(name, bytes)
    }
}

pub struct Memoizer<S> {
    store: S,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: CacheStore> Memoizer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cached<F>(&self, name: &str, compute: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let slot = self.slot_lock(name);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        match self.store.get(name) {
            Ok(Some(bytes)) => {
                log::debug!("cache hit for {name}");
                return Ok(bytes);
            }
            Ok(None) => log::debug!("cache miss for {name}"),
            Err(err) => log::debug!("cache read for {name} failed, recomputing: {err:#}"),
        }

        let bytes = compute().with_context(|| format!("failed to compute {name}"))?;
        self.store
            .put(name, &bytes)
            .with_context(|| format!("failed to store {name}"))?;
        Ok(bytes)
    }

    /// JSON flavour of [`Memoizer::cached`]. The value always comes back
    /// through the stored text, even right after computing it.
    pub fn cached_json<T, F>(&self, name: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let bytes = self.cached(name, || {
            let value = compute()?;
            serde_json::to_vec(&value).with_context(|| format!("failed to serialize {name}"))
        })?;
        serde_json::from_slice(&bytes).with_context(|| format!("failed to parse cached {name}"))
    }

    fn slot_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.entry(name.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct FailingStore;

    impl CacheStore for FailingStore {
        fn get(&self, _name: &str) -> Result<Option<Vec<u8>>> {
            bail!("disk on fire")
        }

        fn put(&self, _name: &str, _bytes: &[u8]) -> Result<()> {
            bail!("disk on fire")
        }
    }

    #[test]
    fn computes_once_then_reuses() {
        let memo = Memoizer::new(MemoryCacheStore::new());
        let calls = Cell::new(0);

        let first: Vec<u32> = memo
            .cached_json("numbers.json", || {
                calls.set(calls.get() + 1);
                Ok(vec![1, 2, 3])
            })
            .expect("first");
        let second: Vec<u32> = memo
            .cached_json("numbers.json", || {
                calls.set(calls.get() + 1);
                Ok(vec![9])
            })
            .expect("second");

        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(second, first);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn file_store_survives_new_memoizer() {
        let dir = tempdir().expect("tempdir");
        let cache_dir = dir.path().join(".cache");

        let memo = Memoizer::new(FileCacheStore::new(&cache_dir));
        memo.cached("greeting", || Ok(b"hello".to_vec()))
            .expect("write");
        assert_eq!(
            fs::read(cache_dir.join("greeting")).expect("read"),
            b"hello".to_vec()
        );

        let memo = Memoizer::new(FileCacheStore::new(&cache_dir));
        let bytes = memo
            .cached("greeting", || bail!("must not recompute"))
            .expect("read back");
        assert_eq!(bytes, b"hello".to_vec());
    }

    #[test]
    fn existing_file_is_authoritative() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("answer.json"), "42").expect("seed");

        let memo = Memoizer::new(FileCacheStore::new(dir.path()));
        let value: u32 = memo.cached_json("answer.json", || Ok(7)).expect("value");

        assert_eq!(value, 42);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let dir = tempdir().expect("tempdir");
        let store = FileCacheStore::new(dir.path());
        let memo = Memoizer::new(store.clone());

        let _: u32 = memo.cached_json("n.json", || Ok(1)).expect("first");
        assert!(store.invalidate("n.json").expect("invalidate"));
        assert!(!store.invalidate("n.json").expect("second invalidate"));

        let value: u32 = memo.cached_json("n.json", || Ok(2)).expect("second");
        assert_eq!(value, 2);
    }

    #[test]
    fn read_failure_is_a_miss_but_write_failure_is_fatal() {
        let memo = Memoizer::new(FailingStore);
        let ran = Cell::new(false);

        let result = memo.cached("x", || {
            ran.set(true);
            Ok(Vec::new())
        });

        assert!(ran.get());
        assert!(result.is_err());
    }

    #[test]
    fn compute_failure_propagates_and_stores_nothing() {
        let memo = Memoizer::new(MemoryCacheStore::new());

        let result: Result<u32> = memo.cached_json("broken.json", || bail!("bad input"));

        assert!(result.is_err());
        assert!(!memo.store().contains("broken.json"));
    }

    #[test]
    fn corrupt_json_entry_is_an_error() {
        let store = MemoryCacheStore::new();
        store.put("bad.json", b"{not json").expect("seed");
        let memo = Memoizer::new(store);

        let result: Result<u32> = memo.cached_json("bad.json", || Ok(1));

        assert!(result.is_err());
    }

    #[test]
    fn concurrent_callers_compute_once() {
        let memo = Arc::new(Memoizer::new(MemoryCacheStore::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    memo.cached("shared", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(5));
                        Ok(b"value".to_vec())
                    })
                })
            })
            .collect();

        for handle in handles {
            let bytes = handle.join().expect("join").expect("cached");
            assert_eq!(bytes, b"value".to_vec());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
