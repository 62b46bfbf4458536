//! Source locations attached to errors.
//!
//! A `Location` stores the query text, an optional file reference and a
//! byte offset. Line and column are only computed when the location is
//! displayed, and then memoized.

use core::fmt;
use std::sync::{Arc, OnceLock};

#[derive(Clone)]
pub struct Location {
    file: Option<Arc<str>>,
    input: Arc<str>,
    pos: usize,
    line_col: OnceLock<(usize, usize)>,
}

impl Location {
    /// `pos` is a byte offset into `input`; offsets past the end are clamped.
    pub fn new(file: Option<&str>, input: &str, pos: usize) -> Self {
        Self {
            file: file.map(Arc::from),
            input: Arc::from(input),
            pos,
            line_col: OnceLock::new(),
        }
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// One-based line and column of the offset.
    pub fn line_col(&self) -> (usize, usize) {
        *self.line_col.get_or_init(|| line_col(&self.input, self.pos))
    }
}

/// Line and column (both one-based) of byte offset `pos` in `input`.
///
/// `\n` starts a new line, `\r` is not counted as a column.
pub fn line_col(input: &str, pos: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in input.char_indices() {
        if i >= pos {
            break;
        }
        match ch {
            '\n' => {
                line += 1;
                col = 1;
            }
            '\r' => {}
            _ => col += 1,
        }
    }
    (line, col)
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        let same_source = match (&self.file, &other.file) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.input == other.input,
            _ => false,
        };
        same_source && self.pos == other.pos
    }
}

impl Eq for Location {}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("file", &self.file)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.line_col();
        write!(f, "{}, {line}/{col}", self.file.as_deref().unwrap_or("."))
    }
}
