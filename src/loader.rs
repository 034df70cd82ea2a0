//! # Program Loader
//!
//! Parses the text program format: whitespace-separated hexadecimal byte
//! tokens, `#` comments (whole-line or end-of-line), bytes loaded from
//! address 0x0000 upward.
//!
//! Parsing is forgiving by design: a malformed token is reported and
//! skipped, and the remaining tokens still load.

use std::error::Error;
use std::fmt;

/// A token that failed to parse as a hexadecimal byte.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenError {
    pub line: usize,
    pub token: String,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {}: '{}' is not a hexadecimal byte",
            self.line, self.token
        )
    }
}

impl Error for TokenError {}

/// Parses program text into a byte image.
///
/// Returns the bytes in file order together with the tokens that failed to
/// parse. Tokens may carry an optional `0x`/`0X` prefix; anything after a
/// `#` on a line is a comment.
///
/// # Examples
///
/// ```
/// use tick6502::loader::parse_program;
///
/// let text = "# load and halt\nA9 0x42   # LDA #$42\n00\n";
/// let (bytes, errors) = parse_program(text);
/// assert_eq!(bytes, vec![0xA9, 0x42, 0x00]);
/// assert!(errors.is_empty());
/// ```
pub fn parse_program(text: &str) -> (Vec<u8>, Vec<TokenError>) {
    let mut bytes = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in text.lines().enumerate() {
        // A '#' anywhere starts an end-of-line comment.
        let code = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };

        for token in code.split_whitespace() {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            match u8::from_str_radix(digits, 16) {
                Ok(byte) => bytes.push(byte),
                Err(_) => errors.push(TokenError {
                    line: index + 1,
                    token: token.to_string(),
                }),
            }
        }
    }

    (bytes, errors)
}
