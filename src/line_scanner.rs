use anyhow::{anyhow, Context};
use memchr::memmem::Finder;
use regex::bytes::Regex;

use crate::inline_string::InlineString;

/// Separates the key from the tail, only the first occurrence in a line counts
pub const KEY_DELIMITER: &[u8] = b". ";

const CODE_DIGITS: usize = 2;

/// Fields of one input line
#[derive(Debug, PartialEq)]
pub struct ParsedLine<'a> {
    key: &'a str,
    tail: InlineString,
    code: u32,
}

impl<'a> ParsedLine<'a> {
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn tail(&self) -> InlineString {
        self.tail
    }

    pub fn code(&self) -> u32 {
        self.code
    }
}

/// Splits a chunk of complete lines into [ParsedLine]s.
///
/// A line is `<key>. <tail><two digit code>\n`. The key ends at the first `". "` of the line,
/// periods not followed by a space and any later `". "` do not end it. The tail is what
/// remains between the delimiter and the code.
///
/// # Examples
/// ```
/// use grouped_text_sort::line_scanner::LineScanner;
/// let mut scanner = LineScanner::new(b"Dr. Jones. NY03\n");
/// let line = scanner.next().unwrap().unwrap();
/// assert_eq!(line.key(), "Dr");
/// assert_eq!(line.tail().as_bytes(), b"Jones. NY");
/// assert_eq!(line.code(), 3);
/// ```
pub struct LineScanner<'a, 'r> {
    chunk: &'a [u8],
    pos: usize,
    line: usize,
    ignore_empty: bool,
    ignore_lines: Option<&'r Regex>,
    delimiter: Finder<'static>,
}

impl<'a, 'r> LineScanner<'a, 'r> {
    pub fn new(chunk: &'a [u8]) -> LineScanner<'a, 'r> {
        LineScanner {
            chunk,
            pos: 0,
            line: 0,
            ignore_empty: false,
            ignore_lines: None,
            delimiter: Finder::new(KEY_DELIMITER),
        }
    }

    /// Skip lines that are empty or hold only whitespace
    pub fn with_ignore_empty(mut self, ignore_empty: bool) -> LineScanner<'a, 'r> {
        self.ignore_empty = ignore_empty;
        self
    }

    /// Skip lines matching `ignore_lines`. The terminator is not part of the matched line.
    pub fn with_ignore_lines(mut self, ignore_lines: Option<&'r Regex>) -> LineScanner<'a, 'r> {
        self.ignore_lines = ignore_lines;
        self
    }

    /// Number of lines consumed so far, skipped lines included
    pub fn lines(&self) -> usize {
        self.line
    }

    fn parse(&self, line: &'a [u8]) -> Result<ParsedLine<'a>, anyhow::Error> {
        let delimiter = self.delimiter.find(line)
            .ok_or_else(|| anyhow!("Key delimiter \". \" not found"))?;
        let tail_start = delimiter + KEY_DELIMITER.len();
        if line.len() < tail_start + CODE_DIGITS {
            return Err(anyhow!("Line is too short to hold a {} digit code after the key", CODE_DIGITS));
        }
        let code_start = line.len() - CODE_DIGITS;
        let code = parse_code(&line[code_start..])?;
        let key = std::str::from_utf8(&line[..delimiter])
            .with_context(|| "Key is not valid UTF-8")?;
        let tail = InlineString::new(&line[tail_start..code_start])?;
        Ok(
            ParsedLine {
                key,
                tail,
                code,
            }
        )
    }
}

fn parse_code(digits: &[u8]) -> Result<u32, anyhow::Error> {
    let mut code = 0;
    for d in digits {
        if !d.is_ascii_digit() {
            return Err(anyhow!("Code is not a {} digit number: {}", CODE_DIGITS, String::from_utf8_lossy(digits)));
        }
        code = code * 10 + (d - b'0') as u32;
    }
    Ok(code)
}

impl<'a, 'r> Iterator for LineScanner<'a, 'r> {
    type Item = Result<ParsedLine<'a>, anyhow::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk: &'a [u8] = self.chunk;
        loop {
            if self.pos >= chunk.len() {
                return None;
            }
            let start = self.pos;
            self.line += 1;
            let end = match memchr::memchr(b'\n', &chunk[start..]) {
                Some(p) => {
                    start + p
                }
                None => {
                    self.pos = chunk.len();
                    return Some(
                        Err(
                            anyhow!(
                                "line within chunk: {}, line is not terminated: {}",
                                self.line,
                                String::from_utf8_lossy(&chunk[start..])
                            )
                        )
                    );
                }
            };
            self.pos = end + 1;
            let line = &chunk[start..end];

            if self.ignore_empty && line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            if let Some(r) = self.ignore_lines {
                if r.is_match(line) {
                    continue;
                }
            }

            let n = self.line;
            return Some(
                self.parse(line)
                    .with_context(|| anyhow!("line within chunk: {}, line: {}", n, String::from_utf8_lossy(line)))
            );
        }
    }
}
