use crate::error::{Result, WordgrepError};
use crate::index::{WordIndex, INITIAL_BUCKET_COUNT};
use crate::normalize::normalized_words;
use crate::registry::FileRegistry;
use crate::source::SourceFile;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Configuration for scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include (empty = all files)
    pub extensions: Vec<String>,

    /// Glob patterns matched against file and directory names to skip
    pub exclude_patterns: Vec<String>,

    /// Maximum file size to index in bytes (None = no limit)
    pub max_file_size: Option<u64>,

    /// Bucket count the word index starts with
    pub initial_buckets: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec![],
            exclude_patterns: vec![],
            max_file_size: None,
            initial_buckets: INITIAL_BUCKET_COUNT,
        }
    }
}

/// Everything built during ingestion: the indexed files and their words
#[derive(Debug, Clone)]
pub struct Corpus {
    /// Root directory that was indexed
    pub root: PathBuf,

    pub files: FileRegistry,

    pub words: WordIndex,
}

/// Walk `root` and index every word of every file found
///
/// A file that cannot be opened aborts the whole build.
pub fn scan_and_index(root: &Path, config: &ScanConfig) -> Result<Corpus> {
    let start = Instant::now();
    info!(root = %root.display(), "indexing directory");

    let paths = collect_files(root, config)?;

    let mut files = FileRegistry::new();
    let mut words = WordIndex::with_buckets(config.initial_buckets);

    for path in &paths {
        let file_index = files.register_file(path);
        index_file(&mut words, path, file_index)?;
    }

    let stats = words.stats();
    info!(
        files = files.file_count(),
        groups = stats.group_count,
        variants = stats.item_count,
        occurrences = stats.occurrence_count,
        buckets = stats.bucket_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "index built"
    );

    Ok(Corpus {
        root: root.to_path_buf(),
        files,
        words,
    })
}

/// Feed every normalized word of one file into the index
pub fn index_file(words: &mut WordIndex, path: &Path, file_index: u32) -> Result<()> {
    let source = SourceFile::open(path)?;

    for (line_number, bytes) in source.lines() {
        let text = String::from_utf8_lossy(bytes);
        for word in normalized_words(&text) {
            words.insert(word, file_index, line_number);
        }
    }

    Ok(())
}

/// Order directory entries: files before subdirectories, then by name
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| WordgrepError::InvalidPattern(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| WordgrepError::InvalidPattern(e.to_string()))
}

/// Collect all files matching the configuration, in indexing order
///
/// The walk is depth-first; within each directory its files come first,
/// sorted by name, followed by its subdirectories.
pub fn collect_files(root: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(WordgrepError::WalkDir(format!(
            "{} is not a readable directory",
            root.display()
        )));
    }

    let excluded = build_exclude_set(&config.exclude_patterns)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !excluded.is_match(e.file_name()))
    {
        let entry = entry.map_err(|e| WordgrepError::WalkDir(e.to_string()))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        // Check extension filter
        if !config.extensions.is_empty() {
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| config.extensions.iter().any(|e| e == ext));
            if !matches {
                debug!(path = %path.display(), "skipped by extension");
                continue;
            }
        }

        // Check file size
        if let Some(max) = config.max_file_size {
            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > max {
                    debug!(path = %path.display(), size = metadata.len(), "skipped oversized file");
                    continue;
                }
            }
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Occurrence;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn relative_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert!(config.extensions.is_empty());
        assert!(config.exclude_patterns.is_empty());
        assert_eq!(config.max_file_size, None);
        assert_eq!(config.initial_buckets, INITIAL_BUCKET_COUNT);
    }

    #[test]
    fn test_files_before_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "b.txt", "b");
        write(root, "a/inner.txt", "inner");
        write(root, "a/z/deep.txt", "deep");
        write(root, "a.txt", "a");
        write(root, "c/last.txt", "last");

        let files = collect_files(root, &ScanConfig::default()).unwrap();

        assert_eq!(
            relative_names(root, &files),
            vec!["a.txt", "b.txt", "a/inner.txt", "a/z/deep.txt", "c/last.txt"]
        );
    }

    #[test]
    fn test_extension_and_exclude_filters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "keep.rs", "fn");
        write(root, "drop.md", "doc");
        write(root, "target/gen.rs", "fn");
        write(root, "src/lib.rs", "fn");

        let config = ScanConfig {
            extensions: vec!["rs".to_string()],
            exclude_patterns: vec!["targ*".to_string()],
            ..ScanConfig::default()
        };
        let files = collect_files(root, &config).unwrap();

        assert_eq!(relative_names(root, &files), vec!["keep.rs", "src/lib.rs"]);
    }

    #[test]
    fn test_max_file_size() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "small.txt", "tiny");
        write(root, "large.txt", &"x".repeat(64));

        let config = ScanConfig {
            max_file_size: Some(16),
            ..ScanConfig::default()
        };
        let files = collect_files(root, &config).unwrap();

        assert_eq!(relative_names(root, &files), vec!["small.txt"]);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let config = ScanConfig {
            exclude_patterns: vec!["[".to_string()],
            ..ScanConfig::default()
        };

        let result = collect_files(temp_dir.path(), &config);
        assert!(matches!(result, Err(WordgrepError::InvalidPattern(_))));
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = scan_and_index(&temp_dir.path().join("nope"), &ScanConfig::default());
        assert!(matches!(result, Err(WordgrepError::WalkDir(_))));
    }

    #[test]
    fn test_scan_and_index_records_lines() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.txt", "The cat\nthe dog\n");
        write(root, "sub/b.txt", "\n...cat!\n");

        let corpus = scan_and_index(root, &ScanConfig::default()).unwrap();

        assert_eq!(corpus.files.file_count(), 2);
        assert_eq!(corpus.files.path(0), Some(root.join("a.txt").as_path()));

        let cat = corpus.words.lookup_exact("cat").unwrap();
        assert_eq!(
            cat.occurrences(),
            &[
                Occurrence {
                    file_index: 0,
                    line_number: 1
                },
                Occurrence {
                    file_index: 1,
                    line_number: 2
                },
            ]
        );

        let the = corpus.words.lookup_group("THE").unwrap();
        assert_eq!(the.variants().len(), 2);
        assert!(corpus.words.lookup_exact("...cat!").is_none());
    }

    #[test]
    fn test_repeated_word_on_one_line_recorded_once() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.txt", "ho ho ho\nho\n");

        let corpus = scan_and_index(temp_dir.path(), &ScanConfig::default()).unwrap();

        assert_eq!(corpus.words.lookup_exact("ho").unwrap().occurrences().len(), 2);
    }

    #[test]
    fn test_initial_buckets_from_config() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.txt", "one two three four five six seven eight");

        let config = ScanConfig {
            initial_buckets: 10,
            ..ScanConfig::default()
        };
        let corpus = scan_and_index(temp_dir.path(), &config).unwrap();

        assert_eq!(corpus.words.bucket_count(), 20);
        assert_eq!(corpus.words.expansions(), 1);
    }
}
