//! Interactive query loop
//!
//! Commands are read as whitespace-separated tokens, resolved against the
//! word index and written to the active output sink as
//! `<path>:<line>: <text>` records.

use crate::error::{Result, WordgrepError};
use crate::index::{Occurrence, WordVariant};
use crate::normalize::{strip_non_alnum, words};
use crate::scanner::Corpus;
use crate::sink::OutputSink;
use crate::source::SourceFile;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prompt written to the console before each command is read
pub const PROMPT: &str = "Query? ";

/// One parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `@q` / `@quit`
    Quit,
    /// `@i <word>` / `@insensitive <word>`
    Insensitive(String),
    /// `@f <path>`
    SwitchOutput(PathBuf),
    /// Any other token
    Sensitive(String),
}

/// Reads whitespace-separated tokens from a line-oriented input
pub struct TokenReader<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or None at end of input
    pub fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let mut buf = Vec::new();
            if self.input.read_until(b'\n', &mut buf)? == 0 {
                return Ok(None);
            }
            let line = String::from_utf8_lossy(&buf);
            self.pending.extend(words(&line).map(str::to_string));
        }
    }

    /// Read the next command; None when input ends before a complete command
    pub fn next_command(&mut self) -> Result<Option<Command>> {
        let Some(token) = self.next_token()? else {
            return Ok(None);
        };

        let command = match token.as_str() {
            "@q" | "@quit" => Command::Quit,
            "@i" | "@insensitive" => match self.next_token()? {
                Some(word) => Command::Insensitive(word),
                None => return Ok(None),
            },
            "@f" => match self.next_token()? {
                Some(path) => Command::SwitchOutput(PathBuf::from(path)),
                None => return Ok(None),
            },
            _ => Command::Sensitive(token),
        };

        Ok(Some(command))
    }
}

/// What a single query wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Lines written to the sink
    pub written: usize,
    /// Candidate lines dropped by the dedup filter
    pub suppressed: usize,
}

/// Format a sensitive-query miss
pub fn sensitive_miss(word: &str) -> String {
    format!("{word} Not Found. Try with @insensitive or @i.")
}

/// Format an insensitive-query miss
pub fn insensitive_miss(word: &str) -> String {
    format!("{word} Not Found.")
}

/// Format one hit as raw bytes: the path and line text are written verbatim
pub fn format_hit(path: &Path, line_number: u32, text: &[u8]) -> Vec<u8> {
    let mut record = path.as_os_str().as_encoded_bytes().to_vec();
    record.extend_from_slice(format!(":{line_number}: ").as_bytes());
    record.extend_from_slice(text);
    record
}

/// Line fetcher that keeps at most one source file open, for one query
struct LineFetcher<'a> {
    corpus: &'a Corpus,
    open: Option<(u32, &'a Path, SourceFile)>,
}

impl<'a> LineFetcher<'a> {
    fn new(corpus: &'a Corpus) -> Self {
        Self { corpus, open: None }
    }

    /// Format the record for an occurrence, re-reading its line from disk
    ///
    /// A line that is no longer in the file is an error, not an empty record.
    fn format(&mut self, occurrence: Occurrence) -> Result<Vec<u8>> {
        let reuse = matches!(&self.open, Some((id, _, _)) if *id == occurrence.file_index);
        if !reuse {
            let path = self.corpus.files.path(occurrence.file_index).ok_or_else(|| {
                WordgrepError::Io(format!("unknown file index {}", occurrence.file_index))
            })?;
            let source = SourceFile::open(path)?;
            self.open = Some((occurrence.file_index, path, source));
        }

        let Some((_, path, source)) = &self.open else {
            unreachable!("source opened above");
        };
        let text = source
            .line(occurrence.line_number)
            .ok_or_else(|| WordgrepError::MissingLine {
                path: path.display().to_string(),
                line_number: occurrence.line_number,
            })?;

        Ok(format_hit(path, occurrence.line_number, text))
    }
}

/// Resolves commands against a built corpus and writes results to the sink
pub struct QueryEngine {
    corpus: Corpus,
    sink: OutputSink,
}

impl QueryEngine {
    pub fn new(corpus: Corpus, sink: OutputSink) -> Self {
        Self { corpus, sink }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    /// Run the command loop until a quit command or end of input
    ///
    /// The prompt goes to `console` before every read. The sink is flushed
    /// when the loop ends.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, console: &mut W) -> Result<()> {
        let mut reader = TokenReader::new(input);

        loop {
            console.write_all(PROMPT.as_bytes())?;
            console.flush()?;

            match reader.next_command()? {
                None | Some(Command::Quit) => break,
                Some(command) => {
                    self.execute(&command)?;
                }
            }
        }

        self.sink.flush()
    }

    /// Execute one command
    pub fn execute(&mut self, command: &Command) -> Result<QueryOutcome> {
        match command {
            Command::Quit => Ok(QueryOutcome::default()),
            Command::SwitchOutput(path) => {
                self.sink.switch_to(path)?;
                Ok(QueryOutcome::default())
            }
            Command::Sensitive(word) => self.query_sensitive(strip_non_alnum(word)),
            Command::Insensitive(word) => self.query_insensitive(strip_non_alnum(word)),
        }
    }

    /// Write every occurrence of the exact spelling `word`
    pub fn query_sensitive(&mut self, word: &str) -> Result<QueryOutcome> {
        self.sink.begin_query();
        let mut outcome = QueryOutcome::default();

        match self.corpus.words.lookup_exact(word) {
            None => {
                self.sink.write_line(sensitive_miss(word).as_bytes())?;
                outcome.written += 1;
            }
            Some(variant) => {
                let mut fetcher = LineFetcher::new(&self.corpus);
                for &occurrence in variant.occurrences() {
                    let line = fetcher.format(occurrence)?;
                    self.sink.write_line(&line)?;
                    outcome.written += 1;
                }
            }
        }

        debug!(word, kind = "sensitive", written = outcome.written, "query resolved");
        Ok(outcome)
    }

    /// Write every occurrence of any casing of `word`, without repeating a line
    pub fn query_insensitive(&mut self, word: &str) -> Result<QueryOutcome> {
        self.sink.begin_query();
        let mut outcome = QueryOutcome::default();

        let variants: &[WordVariant] = self
            .corpus
            .words
            .lookup_group(word)
            .map(|group| group.variants())
            .unwrap_or_default();

        if variants.is_empty() {
            self.sink.write_line(insensitive_miss(word).as_bytes())?;
            outcome.written += 1;
        } else {
            let mut fetcher = LineFetcher::new(&self.corpus);
            for variant in variants {
                for &occurrence in variant.occurrences() {
                    let line = fetcher.format(occurrence)?;
                    if self.sink.write_unique(&line)? {
                        outcome.written += 1;
                    } else {
                        outcome.suppressed += 1;
                    }
                }
            }
        }

        debug!(
            word,
            kind = "insensitive",
            written = outcome.written,
            suppressed = outcome.suppressed,
            "query resolved"
        );
        Ok(outcome)
    }

    /// Flush and hand back the parts
    pub fn into_parts(mut self) -> Result<(Corpus, OutputSink)> {
        self.sink.flush()?;
        Ok((self.corpus, self.sink))
    }
}
