//! Artifact persistence.

use std::fs;
use std::io;
use std::path::Path;

/// Destination for generated sources
pub trait ArtifactWriter {
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes artifacts to the filesystem, creating parent directories
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squareup/geo/location.rs");
        FsWriter.write(&path, "// generated\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "// generated\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.rs");
        fs::write(&path, "stale").unwrap();
        FsWriter.write(&path, "fresh").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh");
    }
}
