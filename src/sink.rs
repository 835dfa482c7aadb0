use crate::error::{Result, WordgrepError};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Switchable, append-only destination for query results
///
/// Tracks how many lines have been written since the destination became
/// active, and a cursor marking where the current query's output began.
/// Lines written at or after the cursor form the dedup window.
pub struct OutputSink {
    path: PathBuf,
    writer: BufWriter<File>,

    /// Lines written since this destination became active
    lines_written: usize,

    /// Value of `lines_written` when the current query started
    cursor: usize,

    /// Formatted lines written at or after the cursor
    window: FxHashSet<Vec<u8>>,
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WordgrepError::unopenable(path, e))?;
    Ok(BufWriter::new(file))
}

impl OutputSink {
    /// Create or truncate `path` and make it the active destination
    pub fn open(path: &Path) -> Result<Self> {
        let writer = create_writer(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            lines_written: 0,
            cursor: 0,
            window: FxHashSet::default(),
        })
    }

    /// Flush the current destination and replace it with `path`
    ///
    /// The new destination starts with an empty dedup window and a zero cursor.
    pub fn switch_to(&mut self, path: &Path) -> Result<()> {
        self.writer.flush()?;

        let writer = create_writer(path)?;
        let previous = std::mem::replace(&mut self.path, path.to_path_buf());
        // Dropping the old writer closes its file
        self.writer = writer;
        self.lines_written = 0;
        self.cursor = 0;
        self.window.clear();

        info!(from = %previous.display(), to = %path.display(), "switched output");
        Ok(())
    }

    /// Move the cursor to the end of the output written so far
    pub fn begin_query(&mut self) {
        self.cursor = self.lines_written;
        self.window.clear();
    }

    /// Write one line unconditionally
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line)?;
        self.writer.write_all(b"\n")?;
        self.lines_written += 1;
        self.window.insert(line.to_vec());
        Ok(())
    }

    /// Write a line unless an identical one was written at or after the cursor
    ///
    /// Returns whether the line was written.
    pub fn write_unique(&mut self, line: &[u8]) -> Result<bool> {
        if self.window.contains(line) {
            return Ok(false);
        }
        self.write_line(line)?;
        Ok(true)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
