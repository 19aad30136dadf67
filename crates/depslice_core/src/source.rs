//! Read access to repository files.
//!
//! The resolver, graph builder and slicer never touch `std::fs` directly;
//! they go through a [`SourceReader`] handed in by the caller. [`DiskSource`]
//! is the real implementation, tests can swap in [`MemorySource`].

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Component, Path, PathBuf},
};

/// Capability for checking and reading repository-relative files.
pub trait SourceReader: Send + Sync {
    /// Returns true if `rel_path` names a regular file.
    fn is_file(&self, rel_path: &str) -> bool;

    /// Current size of the file in bytes.
    fn size(&self, rel_path: &str) -> io::Result<u64>;

    /// Reads the file as UTF-8 text.
    fn read_to_string(&self, rel_path: &str) -> io::Result<String>;
}

/// Reads files below a repository root on disk.
#[derive(Debug, Clone)]
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path)
    }
}

impl SourceReader for DiskSource {
    fn is_file(&self, rel_path: &str) -> bool {
        self.abs(rel_path).is_file()
    }

    fn size(&self, rel_path: &str) -> io::Result<u64> {
        let meta = fs::metadata(self.abs(rel_path))?;
        if !meta.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
        }
        Ok(meta.len())
    }

    fn read_to_string(&self, rel_path: &str) -> io::Result<String> {
        fs::read_to_string(self.abs(rel_path))
    }
}

/// In-memory file set, keyed by repository-relative path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, rel_path: &str, content: &str) -> Self {
        self.insert(rel_path, content);
        self
    }

    pub fn insert(&mut self, rel_path: &str, content: &str) {
        self.files.insert(rel_path.to_string(), content.to_string());
    }

    pub fn remove(&mut self, rel_path: &str) {
        self.files.remove(rel_path);
    }
}

impl SourceReader for MemorySource {
    fn is_file(&self, rel_path: &str) -> bool {
        self.files.contains_key(rel_path)
    }

    fn size(&self, rel_path: &str) -> io::Result<u64> {
        self.files
            .get(rel_path)
            .map(|c| c.len() as u64)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, rel_path.to_string()))
    }

    fn read_to_string(&self, rel_path: &str) -> io::Result<String> {
        self.files
            .get(rel_path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, rel_path.to_string()))
    }
}

/// Converts a path below `root` into the forward-slash relative form used as node ids.
pub fn to_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = if path.is_absolute() { path.strip_prefix(root).ok()? } else { path };
    let mut parts: Vec<String> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(p) => parts.push(p.to_string_lossy().to_string()),
            Component::CurDir => {}
            // Anything climbing out of the root is not a repository path
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disk_source_reads_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("src")).unwrap();
        fs::write(temp_dir.path().join("src/a.ts"), "export const a = 1;").unwrap();

        let source = DiskSource::new(temp_dir.path());
        assert!(source.is_file("src/a.ts"));
        assert!(!source.is_file("src"));
        assert_eq!(source.size("src/a.ts").unwrap(), 19);
        assert!(source.read_to_string("src/a.ts").unwrap().contains("const a"));
        assert!(source.size("src/missing.ts").is_err());
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::new().with_file("a.ts", "abc");
        assert!(source.is_file("a.ts"));
        assert_eq!(source.size("a.ts").unwrap(), 3);
        source.remove("a.ts");
        assert!(source.read_to_string("a.ts").is_err());
    }

    #[test]
    fn test_to_relative() {
        let root = Path::new("/repo");
        assert_eq!(to_relative(root, Path::new("/repo/src/a.ts")), Some("src/a.ts".to_string()));
        assert_eq!(to_relative(root, Path::new("./src/a.ts")), Some("src/a.ts".to_string()));
        assert_eq!(to_relative(root, Path::new("/elsewhere/a.ts")), None);
    }
}
