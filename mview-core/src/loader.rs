/// Asynchronous asset loading with explicit completion results
use log::{debug, info};
use std::path::PathBuf;

use crate::environment::EnvironmentMap;
use crate::error::LoadError;
use crate::geometry::Mesh;
use crate::hdr::decode_hdr;
use crate::stl::parse_stl;

/// Invoked exactly once with the decoded asset or the reason it is missing.
pub type Completion<T> = Box<dyn FnOnce(Result<T, LoadError>)>;

/// Loads the two asset kinds the viewer needs.
///
/// Completions may run before `load_*` returns or at any later point on the
/// same thread; loads are never cancelled.
pub trait AssetLoader {
    fn load_mesh(&self, source: &str, done: Completion<Mesh>);

    fn load_environment(&self, source: &str, done: Completion<EnvironmentMap>);
}

/// Retrieves raw bytes for a source identifier (path or URL).
pub trait Fetch {
    fn fetch(&self, source: &str, done: Completion<Vec<u8>>);
}

/// Fetches bytes and decodes them with the STL and HDR decoders.
#[derive(Debug, Clone, Default)]
pub struct DecodingLoader<F> {
    fetcher: F,
}

impl<F: Fetch> DecodingLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

impl<F: Fetch> AssetLoader for DecodingLoader<F> {
    fn load_mesh(&self, source: &str, done: Completion<Mesh>) {
        info!("loading mesh from {}", source);
        self.fetcher.fetch(
            source,
            Box::new(move |bytes| {
                let mesh = bytes.and_then(|bytes| Ok(parse_stl(&bytes)?));
                if let Ok(mesh) = &mesh {
                    debug!("decoded mesh with {} triangles", mesh.len());
                }
                done(mesh)
            }),
        );
    }

    fn load_environment(&self, source: &str, done: Completion<EnvironmentMap>) {
        info!("loading environment map from {}", source);
        self.fetcher.fetch(
            source,
            Box::new(move |bytes| done(bytes.and_then(|bytes| decode_hdr(&bytes)))),
        );
    }
}

/// Reads sources as files relative to a root directory.
///
/// Completes synchronously, inside the `fetch` call.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, source: &str) -> PathBuf {
        self.root.join(source)
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self, source: &str, done: Completion<Vec<u8>>) {
        let path = self.resolve(source);
        done(std::fs::read(&path).map_err(|error| LoadError::Io {
            asset: path.display().to_string(),
            error,
        }))
    }
}
