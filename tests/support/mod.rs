#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use webentry::fs::{MockFileSystem, RealFileSystem};
use webentry::model::{ApplicationBuilder, ClassIndex};
use webentry::resource::{ClasspathLoader, FsResourceLoader, ResourceLoader};

pub fn webapp_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("webapps")
        .join(name)
}

/// Loader over a checked-in web application
pub fn webapp_loader(name: &str) -> Arc<dyn ResourceLoader> {
    Arc::new(ClasspathLoader::for_webapp(
        Arc::new(RealFileSystem),
        &webapp_path(name),
        None,
    ))
}

/// Class index shipped next to a web application, or empty when there is none
pub fn webapp_classes(name: &str) -> ClassIndex {
    let path = webapp_path(name).join("classes.json");
    match std::fs::read_to_string(&path) {
        Ok(json) => ClassIndex::from_json(&json).expect("fixture class index is valid"),
        Err(_) => ClassIndex::new(),
    }
}

/// In-memory web application rooted at `/webapp`
pub fn mock_loader(files: &[(&str, &str)]) -> Arc<dyn ResourceLoader> {
    let fs = MockFileSystem::new();
    for (path, content) in files {
        fs.add_file(path, content);
    }
    Arc::new(FsResourceLoader::new(Arc::new(fs), "/webapp"))
}

pub fn mock_app(files: &[(&str, &str)]) -> ApplicationBuilder {
    ApplicationBuilder::new(mock_loader(files))
}
