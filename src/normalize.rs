//! Word splitting and normalization
//!
//! Lines are split on ASCII whitespace and each word has its leading and
//! trailing non-alphanumeric characters removed. Interior punctuation is kept,
//! so `"(COMP-15)."` normalizes to `"COMP-15"`.

/// Check if a byte separates words (the C locale `isspace` set)
#[inline]
fn is_word_delimiter(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Split a line into raw whitespace-separated words
pub fn words(line: &str) -> WordIterator<'_> {
    WordIterator::new(line)
}

/// Iterator over the whitespace-separated words of a line
pub struct WordIterator<'a> {
    content: &'a str,
    position: usize,
}

impl<'a> WordIterator<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            position: 0,
        }
    }

    #[inline]
    fn skip_delimiters(&mut self) {
        let bytes = self.content.as_bytes();
        while self.position < bytes.len() && is_word_delimiter(bytes[self.position]) {
            self.position += 1;
        }
    }

    #[inline]
    fn read_word(&mut self) -> Option<&'a str> {
        let bytes = self.content.as_bytes();
        let start = self.position;

        while self.position < bytes.len() && !is_word_delimiter(bytes[self.position]) {
            self.position += 1;
        }

        if self.position > start {
            // Delimiters are ASCII, so both ends fall on char boundaries
            Some(&self.content[start..self.position])
        } else {
            None
        }
    }
}

impl<'a> Iterator for WordIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_delimiters();
        self.read_word()
    }
}

/// Remove leading and trailing characters that are not ASCII alphanumeric
///
/// Returns an empty string when the word has no alphanumeric character.
pub fn strip_non_alnum(word: &str) -> &str {
    let bytes = word.as_bytes();

    let Some(start) = bytes.iter().position(|b| b.is_ascii_alphanumeric()) else {
        return "";
    };
    // A match exists, so rposition cannot fail
    let end = bytes
        .iter()
        .rposition(|b| b.is_ascii_alphanumeric())
        .unwrap_or(start);

    &word[start..=end]
}

/// Case-fold a word to its group key (ASCII only)
#[inline]
pub fn fold_case(word: &str) -> String {
    word.to_ascii_lowercase()
}

/// Split a line into normalized words, dropping those that strip to nothing
pub fn normalized_words(line: &str) -> impl Iterator<Item = &str> + '_ {
    words(line)
        .map(strip_non_alnum)
        .filter(|word| !word.is_empty())
}
