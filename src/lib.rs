//! Word index over a directory tree with an interactive lookup loop
//!
//! Every file under a root directory is read once and each of its words is
//! recorded in a case-folding hash table together with the lines it appears
//! on. Queries then look a word up either by its exact spelling or by any
//! casing, and write `<path>:<line>: <text>` records to an output file that
//! can be switched mid-session.
//!
//! # Example
//!
//! ```no_run
//! use wordgrep::{scan_and_index, OutputSink, QueryEngine, ScanConfig};
//! use std::path::Path;
//!
//! let corpus = scan_and_index(Path::new("docs"), &ScanConfig::default()).unwrap();
//! let sink = OutputSink::open(Path::new("results.txt")).unwrap();
//!
//! let mut engine = QueryEngine::new(corpus, sink);
//! engine.query_sensitive("Rust").unwrap();
//! engine.query_insensitive("rust").unwrap();
//! ```

mod error;
mod index;
mod normalize;
mod query;
mod registry;
mod scanner;
mod sink;
mod source;

// Re-export public API
pub use error::{Result, WordgrepError};
pub use index::{
    IndexStats, Occurrence, WordGroup, WordIndex, WordVariant, INITIAL_BUCKET_COUNT,
    MAX_LOAD_FACTOR,
};
pub use normalize::{fold_case, normalized_words, strip_non_alnum, words};
pub use query::{
    format_hit, insensitive_miss, sensitive_miss, Command, QueryEngine, QueryOutcome,
    TokenReader, PROMPT,
};
pub use registry::FileRegistry;
pub use scanner::{collect_files, index_file, scan_and_index, Corpus, ScanConfig};
pub use sink::OutputSink;
pub use source::SourceFile;
