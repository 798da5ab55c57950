//! FileSystem abstraction for reading deployed web applications
//!
//! Resource loaders sit on top of this so detectors can be exercised against an
//! in-memory application tree in tests.

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{FileMetadata, FileSystem, FileType};
pub use real::RealFileSystem;
