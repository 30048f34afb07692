//! Reader and writer for the event file format.
//!
//! Event files hold a literal mapping from marker key to frame list:
//!
//! ```text
//! {'1': [120, 340, 560], '2': [200, 480]}
//! ```
//!
//! The writer produces exactly this canonical form, so reading a canonical
//! file and writing it back yields identical bytes. The reader is lenient:
//! double-quoted or bare integer keys, any whitespace, and trailing commas
//! are accepted.

use crate::error::{Result, ReviewError};
use crate::events::Markers;

/// Render markers in the canonical literal form.
pub fn to_literal(markers: &Markers) -> String {
    let mut out = String::with_capacity(16 + markers.len() * 8);
    out.push('{');
    for (i, track) in markers.tracks().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_quoted(&mut out, track.key());
        out.push_str(": [");
        for (j, frame) in track.frames().iter().enumerate() {
            if j > 0 {
                out.push_str(", ");
            }
            out.push_str(&frame.to_string());
        }
        out.push(']');
    }
    out.push('}');
    out
}

/// Parse a literal mapping.
pub fn parse_literal(input: &str) -> Result<Markers> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    parser.expect('{')?;
    let mut pairs: Vec<(String, Vec<u64>)> = Vec::new();

    loop {
        parser.skip_ws();
        if parser.eat('}') {
            break;
        }
        let key = parser.key()?;
        parser.skip_ws();
        parser.expect(':')?;
        parser.skip_ws();
        let frames = parser.frame_list()?;
        pairs.push((key, frames));

        parser.skip_ws();
        if parser.eat(',') {
            continue;
        }
        parser.skip_ws();
        parser.expect('}')?;
        break;
    }

    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected trailing {:?}", c)));
    }
    Ok(Markers::from_pairs(pairs))
}

/// Quote a key for the event file.
///
/// Single quotes unless the key contains a single quote and no double quote;
/// backslashes, control characters and the chosen quote are escaped.
fn push_quoted(out: &mut String, key: &str) {
    let quote = if key.contains('\'') && !key.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in key.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(match self.peek() {
                Some(c) => self.error(format!("expected {:?}, found {:?}", expected, c)),
                None => self.error(format!("expected {:?}, found end of input", expected)),
            })
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, message: String) -> ReviewError {
        ReviewError::Parse {
            offset: self.pos,
            message,
        }
    }

    fn key(&mut self) -> Result<String> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.bump();
                self.string_body(q)
            }
            Some(c) if c.is_ascii_digit() => Ok(self.integer()?.to_string()),
            Some(c) => Err(self.error(format!("expected a marker key, found {:?}", c))),
            None => Err(self.error("expected a marker key, found end of input".to_string())),
        }
    }

    fn string_body(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => value.push(c),
                    Some(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => return Err(self.error("unterminated string".to_string())),
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string".to_string())),
            }
        }
    }

    fn frame_list(&mut self) -> Result<Vec<u64>> {
        self.expect('[')?;
        let mut frames = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                return Ok(frames);
            }
            if self.peek() == Some('-') {
                return Err(self.error("frame indices must not be negative".to_string()));
            }
            frames.push(self.integer()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.skip_ws();
            self.expect(']')?;
            return Ok(frames);
        }
    }

    fn integer(&mut self) -> Result<u64> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
        let digits: String = self.input[start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        if digits.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected a frame number, found {:?}", c)),
                None => self.error("expected a frame number, found end of input".to_string()),
            });
        }
        digits
            .parse()
            .map_err(|_| self.error(format!("frame number {} is out of range", digits)))
    }
}
