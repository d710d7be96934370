//! Syntactic check of WKT coordinate system descriptors.
//!
//! Only the bracket grammar is verified: a keyword followed by `[...]` or
//! `(...)` holding comma-separated quoted strings, numbers, bare keywords or
//! nested nodes. [`ProjectionWktValidator`] runs that check first and then
//! asks the projection backend to build the frame.

use geofilter_core::ports::{Projector, WktValidator};
use std::sync::Arc;
use thiserror::Error;

/// Where and why a WKT text stopped parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct WktSyntaxError {
    pub position: usize,
    pub message: String,
}

/// Default [`WktValidator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WktSyntaxChecker;

impl WktValidator for WktSyntaxChecker {
    fn check(&self, wkt: &str) -> Result<(), String> {
        check_wkt_syntax(wkt).map_err(|e| e.to_string())
    }
}

/// [`WktValidator`] that only accepts frames the projector can build
#[derive(Clone)]
pub struct ProjectionWktValidator {
    projector: Arc<dyn Projector>,
}

impl ProjectionWktValidator {
    pub fn new(projector: Arc<dyn Projector>) -> Self {
        Self { projector }
    }
}

impl WktValidator for ProjectionWktValidator {
    fn check(&self, wkt: &str) -> Result<(), String> {
        check_wkt_syntax(wkt).map_err(|e| e.to_string())?;
        self.projector.check_frame(wkt).map_err(|e| e.to_string())
    }
}

/// Verify that `text` is a single well-formed WKT node
pub fn check_wkt_syntax(text: &str) -> Result<(), WktSyntaxError> {
    let mut parser = Parser { bytes: text.as_bytes(), pos: 0 };
    parser.skip_whitespace();
    parser.node()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(())
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> WktSyntaxError {
        WktSyntaxError { position: self.pos, message: message.to_string() }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn keyword(&mut self) -> Result<(), WktSyntaxError> {
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return Err(self.error("expected keyword")),
        }
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        Ok(())
    }

    /// keyword followed by a bracketed item list
    fn node(&mut self) -> Result<(), WktSyntaxError> {
        self.keyword()?;
        self.skip_whitespace();
        let close = match self.peek() {
            Some(b'[') => b']',
            Some(b'(') => b')',
            _ => return Err(self.error("expected '[' or '('")),
        };
        self.pos += 1;
        self.items(close)
    }

    fn items(&mut self, close: u8) -> Result<(), WktSyntaxError> {
        self.skip_whitespace();
        if self.peek() == Some(close) {
            self.pos += 1;
            return Ok(());
        }
        loop {
            self.skip_whitespace();
            self.item()?;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => return Err(self.error("expected ',' or closing bracket")),
                None => return Err(self.error("unterminated bracket")),
            }
        }
    }

    fn item(&mut self) -> Result<(), WktSyntaxError> {
        match self.peek() {
            Some(b'"') => self.quoted(),
            Some(b) if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.') => self.number(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                self.keyword()?;
                self.skip_whitespace();
                match self.peek() {
                    Some(b'[') | Some(b'(') => {
                        let close = if self.peek() == Some(b'[') { b']' } else { b')' };
                        self.pos += 1;
                        self.items(close)
                    }
                    // bare enumeration value such as NORTH
                    _ => Ok(()),
                }
            }
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn quoted(&mut self) -> Result<(), WktSyntaxError> {
        self.pos += 1;
        loop {
            match self.peek() {
                Some(b'"') if self.bytes.get(self.pos + 1) == Some(&b'"') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> Result<(), WktSyntaxError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-') | Some(b'+')) {
            self.pos += 1;
        }
        let mut digits = self.digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.digits();
        }
        if digits == 0 {
            self.pos = start;
            return Err(self.error("malformed number"));
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'-') | Some(b'+')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return Err(self.error("malformed exponent"));
            }
        }
        Ok(())
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }
}
