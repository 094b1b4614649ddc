//! Source tokens attached to artifacts

use serde::{Deserialize, Serialize};

/// A token as produced by the external tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Tokenizer specific token type
    pub kind: u32,
    /// Source text of the token
    pub image: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl Token {
    pub fn new(
        kind: u32,
        image: impl Into<String>,
        start_line: u32,
        end_line: u32,
        start_column: u32,
        end_column: u32,
    ) -> Self {
        Self {
            kind,
            image: image.into(),
            start_line,
            end_line,
            start_column,
            end_column,
        }
    }
}

/// Line range covered by a token list: start line of the first token and
/// end line of the last one, `(0, 0)` for an empty list.
pub fn line_bounds(tokens: &[Token]) -> (u32, u32) {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => (first.start_line, last.end_line),
        _ => (0, 0),
    }
}
