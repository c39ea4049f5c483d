//! A thin wrapper around source text that lazily indexes code points and
//! line breaks, so callers can translate a scan position into a human
//! readable [`Position`] without rescanning the whole string each time.

use once_cell::unsync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source text addressed by code-point index rather than byte index, since
/// the regex and scanner layers both operate on Unicode scalar values.
pub struct Code<'c> {
    value: &'c str,
    chars: OnceCell<Vec<char>>,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'c> From<&'c str> for Code<'c> {
    fn from(value: &'c str) -> Self {
        Code::new(value)
    }
}

impl<'c> Code<'c> {
    pub fn new(value: &'c str) -> Self {
        Self {
            value,
            chars: OnceCell::new(),
            line_breaks: OnceCell::new(),
        }
    }

    /// The code points of the underlying text, decoded once and cached.
    pub fn chars(&self) -> &[char] {
        self.chars.get_or_init(|| self.value.chars().collect())
    }

    pub fn len(&self) -> usize {
        self.chars().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars().is_empty()
    }

    fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.chars()
                .iter()
                .enumerate()
                .filter_map(|(index, c)| if *c == '\n' { Some(index) } else { None })
                .collect()
        })
    }

    /// Translate a code-point index into a 1-based line/column pair.
    pub fn obtain_position(&self, pointer: usize) -> Position {
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&pointer) {
            Ok(index) | Err(index) => index,
        };
        if index == 0 {
            Position::new(1, pointer + 1)
        } else {
            let break_point = line_breaks[index - 1] + 1;
            Position::new(index + 1, pointer - break_point + 1)
        }
    }
}
