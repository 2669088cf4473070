//! Fixit records: `<line>:<column> <length> <replacementText>`.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed fixit record: {record:?}")]
pub struct ParseFixitError {
    record: String,
}

/// A suggested text replacement on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixit {
    /// 1-indexed line number.
    line: u32,
    /// 1-indexed column.
    col: u32,
    /// Number of original characters replaced.
    length: usize,
    text: String,
}

fn parse_digits<T: FromStr>(raw: &str) -> Option<T> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl Fixit {
    #[must_use]
    pub fn new(line: u32, col: u32, length: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            col,
            length,
            text: text.into(),
        }
    }

    /// 1-indexed line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-indexed column.
    #[must_use]
    pub fn col(&self) -> u32 {
        self.col
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 0-indexed line into the buffer.
    #[must_use]
    pub fn line_index(&self) -> usize {
        self.line.saturating_sub(1) as usize
    }

    /// Splice the replacement into `line`, dropping `length` characters at
    /// the fixit column. Offsets are in characters and clamp to the line end.
    #[must_use]
    pub fn apply(&self, line: &str) -> String {
        let start = self.col.saturating_sub(1) as usize;
        let byte_at = |chars: usize| {
            line.char_indices()
                .nth(chars)
                .map_or(line.len(), |(idx, _)| idx)
        };
        let head_end = byte_at(start);
        let tail_start = byte_at(start.saturating_add(self.length));

        let mut out = String::with_capacity(line.len() + self.text.len());
        out.push_str(&line[..head_end]);
        out.push_str(&self.text);
        out.push_str(&line[tail_start..]);
        out
    }
}

impl FromStr for Fixit {
    type Err = ParseFixitError;

    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseFixitError {
            record: record.to_string(),
        };
        let (line, rest) = record.split_once(':').ok_or_else(malformed)?;
        let (col, rest) = rest.split_once(' ').ok_or_else(malformed)?;
        let (length, text) = rest.split_once(' ').ok_or_else(malformed)?;
        if text.is_empty() || text.contains('\n') {
            return Err(malformed());
        }

        let line: u32 = parse_digits(line).ok_or_else(malformed)?;
        let col: u32 = parse_digits(col).ok_or_else(malformed)?;
        if line == 0 || col == 0 {
            return Err(malformed());
        }

        Ok(Self {
            line,
            col,
            length: parse_digits(length).ok_or_else(malformed)?,
            text: text.to_string(),
        })
    }
}
