use std::collections::HashMap;

use super::Response;

/// One named cache: request path to stored response.
#[derive(Clone, Debug, Default)]
pub struct Cache {
    entries: HashMap<String, Response>,
}

impl Cache {
    pub fn get(&self, path: &str) -> Option<&Response> {
        self.entries.get(path)
    }

    pub fn put(&mut self, path: &str, response: Response) {
        self.entries.insert(path.to_string(), response);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All caches of one origin, kept in creation order so lookups across
/// caches are stable.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: Vec<(String, Cache)>,
}

impl CacheStorage {
    pub fn new() -> Self {
        CacheStorage::default()
    }

    /// Returns the cache called `name`, creating it when missing.
    pub fn open(&mut self, name: &str) -> &mut Cache {
        let idx = match self.caches.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.caches.push((name.to_string(), Cache::default()));
                self.caches.len() - 1
            }
        };
        &mut self.caches[idx].1
    }

    pub fn get(&self, name: &str) -> Option<&Cache> {
        self.caches.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        self.caches.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.caches.len();
        self.caches.retain(|(n, _)| n != name);
        self.caches.len() != before
    }

    /// First stored response for `path` in any cache.
    pub fn match_any(&self, path: &str) -> Option<&Response> {
        self.caches.iter().find_map(|(_, c)| c.get(path))
    }
}
