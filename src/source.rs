use crate::error::{Result, WordgrepError};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// A memory-mapped source document, read as `\n`-separated lines
///
/// Line terminators are stripped; a carriage return before the newline is
/// kept as part of the line text. A final line without a newline still counts.
pub struct SourceFile {
    /// None for empty files, which cannot be mapped
    mmap: Option<Mmap>,
}

impl SourceFile {
    /// Open and map a file, failing with a configuration error if it cannot be opened
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| WordgrepError::unopenable(path, e))?;
        let metadata = file.metadata()?;

        if metadata.len() == 0 {
            return Ok(Self { mmap: None });
        }

        let mmap = unsafe { Mmap::map(&file).map_err(|e| WordgrepError::unopenable(path, e))? };

        Ok(Self { mmap: Some(mmap) })
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Iterate over lines paired with their 1-based line numbers
    pub fn lines(&self) -> impl Iterator<Item = (u32, &[u8])> + '_ {
        LineIterator::new(self.bytes())
            .enumerate()
            .map(|(idx, line)| (idx as u32 + 1, line))
    }

    /// Get the text of a 1-based line number
    pub fn line(&self, line_number: u32) -> Option<&[u8]> {
        let idx = (line_number as usize).checked_sub(1)?;
        LineIterator::new(self.bytes()).nth(idx)
    }
}

/// Splits content on `\n`, yielding no trailing empty line after a final newline
struct LineIterator<'a> {
    content: &'a [u8],
    position: usize,
}

impl<'a> LineIterator<'a> {
    fn new(content: &'a [u8]) -> Self {
        Self {
            content,
            position: 0,
        }
    }
}

impl<'a> Iterator for LineIterator<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.content.len() {
            return None;
        }

        let rest = &self.content[self.position..];
        match rest.iter().position(|&b| b == b'\n') {
            Some(end) => {
                self.position += end + 1;
                Some(&rest[..end])
            }
            None => {
                self.position = self.content.len();
                Some(rest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lines_numbered_from_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "The cat\nthe dog\n").unwrap();

        let source = SourceFile::open(&path).unwrap();
        let lines: Vec<_> = source.lines().collect();

        assert_eq!(lines, vec![(1, &b"The cat"[..]), (2, &b"the dog"[..])]);
    }

    #[test]
    fn test_unterminated_last_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "one\n\nthree").unwrap();

        let source = SourceFile::open(&path).unwrap();

        assert_eq!(source.lines().count(), 3);
        assert_eq!(source.line(2), Some(&b""[..]));
        assert_eq!(source.line(3), Some(&b"three"[..]));
        assert_eq!(source.line(4), None);
        assert_eq!(source.line(0), None);
    }

    #[test]
    fn test_carriage_return_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        std::fs::write(&path, "first\r\nsecond\r\n").unwrap();

        let source = SourceFile::open(&path).unwrap();
        assert_eq!(source.line(1), Some(&b"first\r"[..]));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let source = SourceFile::open(&path).unwrap();
        assert_eq!(source.lines().count(), 0);
        assert_eq!(source.line(1), None);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = tempdir().unwrap();
        let result = SourceFile::open(&dir.path().join("missing.txt"));

        assert!(matches!(
            result,
            Err(WordgrepError::Configuration { .. })
        ));
    }
}
