//! Offline asset cache.
//!
//! A versioned cache of the game's static files. Installing pre-fetches the
//! asset manifest, activating drops every cache from another version, and
//! fetches are answered from the cache first with the network as fallback
//! (navigations go the other way round: network first, cached page when
//! offline). Bumping `CACHE_NAME` is the only way stale entries go away.

use log::{error, info, warn};
use thiserror::Error;

pub mod origin;
pub mod storage;

pub use origin::{DirOrigin, NetworkError, Origin};
pub use storage::{Cache, CacheStorage};

pub const CACHE_NAME: &str = "snake-game-cache-v1.0";

pub const ASSET_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/style.css",
    "/app.js",
    "/manifest.json",
    "/images/icon-48x48.png",
    "/images/icon-72x72.png",
    "/images/icon-96x96.png",
    "/images/icon-144x144.png",
    "/images/icon-192x192.png",
    "/images/icon-512x512.png",
];

/// Page served to navigations while offline.
pub const OFFLINE_PAGE: &str = "/index.html";

const UNAVAILABLE_BODY: &[u8] = b"Network error or resource not cached.";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub path: String,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(path: &str) -> Self {
        Request { path: path.to_string(), mode: RequestMode::Other }
    }

    pub fn navigate(path: &str) -> Self {
        Request { path: path.to_string(), mode: RequestMode::Navigate }
    }
}

/// Same-origin responses are `Basic`; only those are worth caching.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, kind: ResponseKind, body: Vec<u8>) -> Self {
        Response { status, kind, body }
    }

    pub fn ok(body: Vec<u8>) -> Self {
        Response::new(200, ResponseKind::Basic, body)
    }

    pub fn unavailable() -> Self {
        Response::new(503, ResponseKind::Error, UNAVAILABLE_BODY.to_vec())
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("fetching {path}: {source}")]
    Network {
        path: String,
        #[source]
        source: NetworkError,
    },
    #[error("fetching {path}: status {status}")]
    BadStatus { path: String, status: u16 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installed,
    Activated,
}

pub struct OfflineCache {
    name: String,
    manifest: Vec<String>,
    storage: CacheStorage,
    state: WorkerState,
    skip_waiting: bool,
    controls_clients: bool,
}

impl OfflineCache {
    pub fn new(storage: CacheStorage) -> Self {
        Self::with_version(CACHE_NAME, ASSET_MANIFEST, storage)
    }

    pub fn with_version(name: &str, manifest: &[&str], storage: CacheStorage) -> Self {
        OfflineCache {
            name: name.to_string(),
            manifest: manifest.iter().map(|p| p.to_string()).collect(),
            storage,
            state: WorkerState::Parsed,
            skip_waiting: false,
            controls_clients: false,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Set once install cached the whole manifest; the worker then does not
    /// wait for old pages to close before activating.
    pub fn skips_waiting(&self) -> bool {
        self.skip_waiting
    }

    pub fn controls_clients(&self) -> bool {
        self.controls_clients
    }

    /// Fetches the whole manifest and stores it all or not at all. A failure
    /// is logged and returned but the worker still counts as installed.
    pub fn install(&mut self, origin: &dyn Origin) -> Result<usize, InstallError> {
        info!("[Cache] Installing {}", self.name);
        self.state = WorkerState::Installed;

        let fetched = match self.fetch_manifest(origin) {
            Ok(fetched) => fetched,
            Err(e) => {
                error!("[Cache] Caching the app shell failed: {}", e);
                return Err(e);
            }
        };

        info!("[Cache] Caching app shell ({} files)", fetched.len());
        let count = fetched.len();
        let cache = self.storage.open(&self.name);
        for (path, response) in fetched {
            cache.put(&path, response);
        }

        self.skip_waiting = true;
        Ok(count)
    }

    fn fetch_manifest(&self, origin: &dyn Origin) -> Result<Vec<(String, Response)>, InstallError> {
        let mut fetched = Vec::with_capacity(self.manifest.len());
        for path in &self.manifest {
            let response = origin
                .fetch(&Request::get(path))
                .map_err(|source| InstallError::Network { path: path.clone(), source })?;
            if !response.is_ok() {
                return Err(InstallError::BadStatus { path: path.clone(), status: response.status });
            }
            fetched.push((path.clone(), response));
        }
        Ok(fetched)
    }

    /// Deletes every cache that is not this version's, then takes control of
    /// open pages. Returns the names of the deleted caches.
    pub fn activate(&mut self) -> Vec<String> {
        info!("[Cache] Activating {}", self.name);

        let stale: Vec<String> = self.storage.keys().into_iter().filter(|n| *n != self.name).collect();
        for name in &stale {
            info!("[Cache] Deleting old cache: {}", name);
            self.storage.delete(name);
        }

        self.state = WorkerState::Activated;
        self.controls_clients = true;
        stale
    }

    pub fn fetch(&mut self, origin: &dyn Origin, request: &Request) -> Response {
        match request.mode {
            RequestMode::Navigate => self.fetch_navigation(origin, request),
            RequestMode::Other => self.fetch_asset(origin, request),
        }
    }

    fn fetch_navigation(&self, origin: &dyn Origin, request: &Request) -> Response {
        match origin.fetch(request) {
            Ok(response) => response,
            Err(e) => {
                warn!("[Cache] Offline navigation to {} ({}), serving {}", request.path, e, OFFLINE_PAGE);
                self.storage
                    .match_any(OFFLINE_PAGE)
                    .cloned()
                    .unwrap_or_else(Response::unavailable)
            }
        }
    }

    fn fetch_asset(&mut self, origin: &dyn Origin, request: &Request) -> Response {
        if let Some(hit) = self.storage.match_any(&request.path) {
            return hit.clone();
        }

        info!("[Cache] Fetching from network: {}", request.path);
        match origin.fetch(request) {
            Ok(response) => {
                if response.is_cacheable() {
                    self.storage.open(&self.name).put(&request.path, response.clone());
                }
                response
            }
            Err(e) => {
                error!("[Cache] Fetch failed: {} {}", request.path, e);
                Response::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct FakeOrigin {
        files: HashMap<String, Response>,
        online: bool,
        hits: Cell<usize>,
    }

    impl FakeOrigin {
        fn with(files: &[(&str, Response)]) -> Self {
            FakeOrigin {
                files: files.iter().map(|(p, r)| (p.to_string(), r.clone())).collect(),
                online: true,
                hits: Cell::new(0),
            }
        }
    }

    impl Origin for FakeOrigin {
        fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
            self.hits.set(self.hits.get() + 1);
            if !self.online {
                return Err(NetworkError::new("offline"));
            }
            Ok(self
                .files
                .get(&request.path)
                .cloned()
                .unwrap_or_else(|| Response::new(404, ResponseKind::Basic, vec![])))
        }
    }

    #[test]
    fn install_is_all_or_nothing() {
        let origin = FakeOrigin::with(&[("/a", Response::ok(b"a".to_vec()))]);
        let mut worker = OfflineCache::with_version("v2", &["/a", "/b"], CacheStorage::new());

        let err = worker.install(&origin).unwrap_err();
        assert!(matches!(err, InstallError::BadStatus { status: 404, .. }));
        assert_eq!(err.to_string(), "fetching /b: status 404");
        assert_eq!(worker.state(), WorkerState::Installed);
        assert!(!worker.skips_waiting());
        assert!(worker.storage().match_any("/a").is_none());
    }

    #[test]
    fn network_failure_keeps_its_cause() {
        let mut origin = FakeOrigin::with(&[]);
        origin.online = false;
        let mut worker = OfflineCache::with_version("v2", &["/a"], CacheStorage::new());

        let err = worker.install(&origin).unwrap_err();
        assert_eq!(err.to_string(), "fetching /a: network error: offline");
        let cause = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(cause, Some("network error: offline".to_string()));
    }

    #[test]
    fn cached_assets_skip_the_network() {
        let origin = FakeOrigin::with(&[("/a", Response::ok(b"a".to_vec()))]);
        let mut worker = OfflineCache::with_version("v2", &["/a"], CacheStorage::new());
        assert_eq!(worker.install(&origin).unwrap(), 1);

        let before = origin.hits.get();
        let response = worker.fetch(&origin, &Request::get("/a"));
        assert_eq!(response.body, b"a".to_vec());
        assert_eq!(origin.hits.get(), before);
    }

    #[test]
    fn only_basic_200_responses_are_stored() {
        let origin = FakeOrigin::with(&[
            ("/cdn.js", Response::new(200, ResponseKind::Cors, b"x".to_vec())),
            ("/local.js", Response::ok(b"y".to_vec())),
        ]);
        let mut worker = OfflineCache::with_version("v2", &[], CacheStorage::new());

        worker.fetch(&origin, &Request::get("/cdn.js"));
        worker.fetch(&origin, &Request::get("/local.js"));
        worker.fetch(&origin, &Request::get("/missing.js"));

        assert!(worker.storage().match_any("/cdn.js").is_none());
        assert!(worker.storage().match_any("/local.js").is_some());
        assert!(worker.storage().match_any("/missing.js").is_none());
    }

    #[test]
    fn navigation_prefers_the_network() {
        let origin = FakeOrigin::with(&[("/index.html", Response::ok(b"fresh".to_vec()))]);
        let mut storage = CacheStorage::new();
        storage.open("v2").put("/index.html", Response::ok(b"stale".to_vec()));
        let mut worker = OfflineCache::with_version("v2", &[], storage);

        let response = worker.fetch(&origin, &Request::navigate("/index.html"));
        assert_eq!(response.body, b"fresh".to_vec());
    }
}
