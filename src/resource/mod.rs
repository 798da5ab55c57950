//! Resource loading for configuration files referenced by a web application
//!
//! Logical paths are the ones written in deployment descriptors, e.g.
//! `/WEB-INF/struts-config.xml`. They are always resolved relative to a loader
//! root; a leading slash does not escape it.

use crate::error::DetectError;
use crate::fs::FileSystem;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Component as PathComponent, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Resolves logical resource paths to bytes
pub trait ResourceLoader: Send + Sync {
    /// Opens the resource at `path`, failing with `ResourceNotFound` when it cannot be resolved
    fn get_input_stream(&self, path: &str) -> Result<Box<dyn Read + Send>, DetectError>;

    fn exists(&self, path: &str) -> bool;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;

    fn read_all(&self, path: &str) -> Result<Vec<u8>, DetectError> {
        let mut stream = self.get_input_stream(path)?;
        let mut buffer = Vec::new();
        stream
            .read_to_end(&mut buffer)
            .map_err(|e| DetectError::ResourceRead {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        Ok(buffer)
    }
}

impl fmt::Debug for dyn ResourceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceLoader({})", self.describe())
    }
}

/// Loads resources below a directory of a [`FileSystem`]
pub struct FsResourceLoader {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    max_size: Option<u64>,
}

impl FsResourceLoader {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            max_size: None,
        }
    }

    /// Rejects resources larger than `max_size` bytes
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a logical path to a file below the root; `None` if it would leave the root
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim().trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                PathComponent::Normal(part) => resolved.push(part),
                PathComponent::CurDir => {}
                PathComponent::ParentDir | PathComponent::RootDir | PathComponent::Prefix(_) => {
                    return None
                }
            }
        }
        Some(resolved)
    }
}

impl ResourceLoader for FsResourceLoader {
    fn get_input_stream(&self, path: &str) -> Result<Box<dyn Read + Send>, DetectError> {
        let resolved = self
            .resolve(path)
            .filter(|p| self.fs.is_file(p))
            .ok_or_else(|| DetectError::not_found(path))?;

        if let Some(limit) = self.max_size {
            let meta = self
                .fs
                .metadata(&resolved)
                .map_err(|e| DetectError::ResourceRead {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
            if meta.len() > limit {
                return Err(DetectError::ResourceRead {
                    path: path.to_string(),
                    message: format!("{} bytes exceeds limit of {} bytes", meta.len(), limit),
                });
            }
        }

        debug!("Loading {} from {}", path, resolved.display());
        let bytes = self.fs.read(&resolved).map_err(|e| DetectError::ResourceRead {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path)
            .map(|p| self.fs.is_file(&p))
            .unwrap_or(false)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Tries each entry in order and serves the first hit
#[derive(Default)]
pub struct ClasspathLoader {
    entries: Vec<Arc<dyn ResourceLoader>>,
}

impl ClasspathLoader {
    pub fn new(entries: Vec<Arc<dyn ResourceLoader>>) -> Self {
        Self { entries }
    }

    /// The lookup order a servlet container uses for an exploded web application:
    /// the document root, then `WEB-INF/classes`.
    pub fn for_webapp(fs: Arc<dyn FileSystem>, root: &Path, max_size: Option<u64>) -> Self {
        let mut entries: Vec<Arc<dyn ResourceLoader>> = Vec::new();
        for dir in [root.to_path_buf(), root.join("WEB-INF").join("classes")] {
            let mut loader = FsResourceLoader::new(fs.clone(), dir);
            if let Some(limit) = max_size {
                loader = loader.with_max_size(limit);
            }
            entries.push(Arc::new(loader));
        }
        Self { entries }
    }

    pub fn push(&mut self, entry: Arc<dyn ResourceLoader>) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceLoader for ClasspathLoader {
    fn get_input_stream(&self, path: &str) -> Result<Box<dyn Read + Send>, DetectError> {
        match self.entries.iter().find(|entry| entry.exists(path)) {
            Some(entry) => entry.get_input_stream(path),
            None => Err(DetectError::not_found(path)),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.exists(path))
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.entries.iter().map(|e| e.describe()).collect();
        format!("classpath[{}]", parts.join(", "))
    }
}
