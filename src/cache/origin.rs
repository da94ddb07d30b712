//! The network side of the asset cache.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use super::{Request, Response, ResponseKind};

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network error: {0}")]
    Unreachable(String),
    #[error("network error: {0}")]
    Io(#[from] io::Error),
}

impl NetworkError {
    pub fn new(message: impl Into<String>) -> Self {
        NetworkError::Unreachable(message.into())
    }
}

/// Anything that can answer a request when the network is up.
pub trait Origin {
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// Serves files below a root directory, `/` mapping to `index.html`.
pub struct DirOrigin {
    root: PathBuf,
}

impl DirOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirOrigin { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = path.trim_start_matches('/');
        let rel = if rel.is_empty() { "index.html" } else { rel };

        let rel = Path::new(rel);
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            return None;
        }
        Some(self.root.join(rel))
    }
}

impl Origin for DirOrigin {
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        if !self.root.is_dir() {
            return Err(NetworkError::new(format!("{} is unreachable", self.root.display())));
        }

        let file = match self.resolve(&request.path) {
            Some(file) => file,
            None => return Ok(Response::new(404, ResponseKind::Basic, b"Not Found".to_vec())),
        };

        match std::fs::read(&file) {
            Ok(body) => Ok(Response::ok(body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(Response::new(404, ResponseKind::Basic, b"Not Found".to_vec()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
