use std::path::{Path, PathBuf};

/// Append-only registry of indexed file paths
///
/// Each file receives a stable index at registration time; occurrences refer
/// to files by that index instead of carrying the full path. Paths are kept
/// exactly as the walker produced them, so names that are not valid UTF-8
/// still reopen at query time.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    paths: Vec<PathBuf>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its index
    pub fn register_file(&mut self, path: &Path) -> u32 {
        let file_index = self.paths.len() as u32;
        self.paths.push(path.to_path_buf());
        file_index
    }

    /// Path of the file registered under `file_index`
    pub fn path(&self, file_index: u32) -> Option<&Path> {
        self.paths.get(file_index as usize).map(PathBuf::as_path)
    }

    pub fn file_count(&self) -> usize {
        self.paths.len()
    }

    /// Iterate over all files in registration order
    pub fn iter_files(&self) -> impl Iterator<Item = (u32, &Path)> + '_ {
        self.paths
            .iter()
            .enumerate()
            .map(|(idx, path)| (idx as u32, path.as_path()))
    }
}
