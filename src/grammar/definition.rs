//! Definition-file (`.sii`) grammar — lexer and recursive descent parser.
//!
//! A file is a sequence of `group : dotted.name { property* }` entries,
//! optionally wrapped in `SiiNunit { … }`. Properties carry decimal or
//! `&`-hex literals, quoted or bare text, parenthesized tuples, and
//! bare dotted cross references.

use std::path::Path;

use crate::model::{Float2, Float3, Float4, Value};
use crate::{Error, Result};

use super::numeric;
use super::{Property, PropertyKind, Span, line_at};

/// One parsed `group : dotted.name { … }` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SiiEntry {
    pub group: String,
    /// Dotted namespace path of the entry, quotes stripped.
    pub name: String,
    pub properties: Vec<Property>,
}

/// Parse a complete definition file into its entries, in source order.
pub fn parse_definition(source: &str, path: &Path) -> Result<Vec<SiiEntry>> {
    let tokens = lex(source, path)?;
    Parser { tokens: &tokens, pos: 0, source, path }.parse_file()
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    /// Bare run of `[A-Za-z0-9_.&@-]` — identifiers, numbers, hex
    /// literals, references and directives alike.
    Word,
    /// Double-quoted string, quotes stripped, no escape processing.
    Str,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct RawToken {
    kind: RawKind,
    span: Span,
    text: String,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '&' | '@')
}

fn lex(input: &str, path: &Path) -> Result<Vec<RawToken>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    let syntax = |pos: usize, message: String| Error::Syntax {
        path: path.to_path_buf(),
        line: line_at(input, pos).to_string(),
        message,
    };

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }

            // Block comments /* ... */
            '/' if matches!(chars.clone().nth(1), Some((_, '*'))) => {
                chars.next();
                chars.next();
                loop {
                    match chars.next() {
                        Some((_, '*')) if matches!(chars.peek(), Some(&(_, '/'))) => {
                            chars.next();
                            break;
                        }
                        Some(_) => {}
                        None => {
                            return Err(syntax(pos, "unterminated block comment".into()));
                        }
                    }
                }
            }

            // Line comments: // and #
            '/' if matches!(chars.clone().nth(1), Some((_, '/'))) => {
                while chars.peek().is_some_and(|&(_, c)| c != '\n') {
                    chars.next();
                }
            }
            '#' => {
                while chars.peek().is_some_and(|&(_, c)| c != '\n') {
                    chars.next();
                }
            }

            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((end, '"')) => {
                            tokens.push(RawToken {
                                kind: RawKind::Str,
                                span: Span { start: pos, end: end + 1 },
                                text,
                            });
                            break;
                        }
                        Some((_, c)) => text.push(c),
                        None => {
                            return Err(syntax(pos, "unterminated string literal".into()));
                        }
                    }
                }
            }

            c if is_word_char(c) => {
                let mut text = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if is_word_char(c) {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(RawToken {
                    kind: RawKind::Word,
                    span: Span { start: pos, end: pos + text.len() },
                    text,
                });
            }

            '{' => punct(&mut tokens, &mut chars, RawKind::LBrace, pos, "{"),
            '}' => punct(&mut tokens, &mut chars, RawKind::RBrace, pos, "}"),
            '(' => punct(&mut tokens, &mut chars, RawKind::LParen, pos, "("),
            ')' => punct(&mut tokens, &mut chars, RawKind::RParen, pos, ")"),
            '[' => punct(&mut tokens, &mut chars, RawKind::LBracket, pos, "["),
            ']' => punct(&mut tokens, &mut chars, RawKind::RBracket, pos, "]"),
            ':' => punct(&mut tokens, &mut chars, RawKind::Colon, pos, ":"),
            ',' => punct(&mut tokens, &mut chars, RawKind::Comma, pos, ","),

            other => {
                // Junk ahead of the first token (a BOM, stray
                // punctuation before the header) is skipped; after
                // that, an unknown character is malformed input.
                if tokens.is_empty() {
                    chars.next();
                } else {
                    return Err(syntax(pos, format!("unexpected character '{other}'")));
                }
            }
        }
    }

    tokens.push(RawToken {
        kind: RawKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });
    Ok(tokens)
}

fn punct(
    tokens: &mut Vec<RawToken>,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    kind: RawKind,
    pos: usize,
    text: &str,
) {
    chars.next();
    tokens.push(RawToken {
        kind,
        span: Span { start: pos, end: pos + text.len() },
        text: text.to_string(),
    });
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'t> {
    tokens: &'t [RawToken],
    pos: usize,
    source: &'t str,
    path: &'t Path,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> &RawToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &RawToken {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, kind: RawKind) -> bool {
        self.peek().kind == kind
    }

    fn eat(&mut self, kind: RawKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: RawKind) -> Result<&RawToken> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(self.error(
                tok.span.start,
                format!("expected {kind:?}, got {:?} '{}'", tok.kind, tok.text),
            ))
        }
    }

    fn error(&self, pos: usize, message: String) -> Error {
        Error::Syntax {
            path: self.path.to_path_buf(),
            line: line_at(self.source, pos).to_string(),
            message,
        }
    }

    fn parse_file(mut self) -> Result<Vec<SiiEntry>> {
        // Optional SiiNunit { ... } wrapper; not semantically meaningful.
        if self.at(RawKind::Word) && self.peek().text == "SiiNunit" {
            self.advance();
            self.expect(RawKind::LBrace)?;
        }

        let mut entries = Vec::new();
        loop {
            if self.at(RawKind::Eof) {
                break;
            }
            if self.at(RawKind::RBrace) {
                // Wrapper footer; tolerated even without a header.
                self.advance();
                break;
            }
            if self.peek().text == "@include" {
                return self.include_unsupported();
            }
            entries.push(self.parse_entry()?);
        }

        if !self.at(RawKind::Eof) {
            let tok = self.peek();
            return Err(self.error(
                tok.span.start,
                format!("unexpected trailing input '{}'", tok.text),
            ));
        }
        Ok(entries)
    }

    fn parse_entry(&mut self) -> Result<SiiEntry> {
        let group = self.expect(RawKind::Word)?.text.clone();
        self.expect(RawKind::Colon)?;
        // Entry names may be quoted: road_look : "road.look3" { ... }
        let name = match self.peek().kind {
            RawKind::Str => self.advance().text.clone(),
            RawKind::Word => self.advance().text.clone(),
            _ => {
                let tok = self.peek();
                return Err(self.error(
                    tok.span.start,
                    format!("expected entry name, got '{}'", tok.text),
                ));
            }
        };
        self.expect(RawKind::LBrace)?;

        let mut properties = Vec::new();
        while !self.eat(RawKind::RBrace) {
            if self.at(RawKind::Eof) {
                let tok = self.peek();
                return Err(self.error(tok.span.start, format!("unterminated entry '{name}'")));
            }
            if self.peek().text == "@include" {
                return self.include_unsupported();
            }
            properties.push(self.parse_property()?);
        }

        Ok(SiiEntry { group, name, properties })
    }

    fn include_unsupported<T>(&mut self) -> Result<T> {
        self.advance();
        let target = match self.peek().kind {
            RawKind::Str => self.advance().text.clone(),
            _ => String::new(),
        };
        Err(Error::IncludeUnsupported {
            path: self.path.to_path_buf(),
            target,
        })
    }

    fn parse_property(&mut self) -> Result<Property> {
        let identifier = self.expect(RawKind::Word)?.text.clone();

        // ident[]: or ident[N]: marks an array element.
        let array = if self.eat(RawKind::LBracket) {
            if self.at(RawKind::Word) {
                // Declared capacity, ignored.
                self.advance();
            }
            self.expect(RawKind::RBracket)?;
            true
        } else {
            false
        };

        self.expect(RawKind::Colon)?;
        let (kind, value) = self.parse_value()?;

        if array {
            Ok(Property::scalar(PropertyKind::Array, identifier, value))
        } else {
            Ok(Property::scalar(kind, identifier, value))
        }
    }

    fn parse_value(&mut self) -> Result<(PropertyKind, Value)> {
        match self.peek().kind {
            RawKind::Str => {
                let text = self.advance().text.clone();
                Ok((PropertyKind::Text, Value::String(text)))
            }
            RawKind::LParen => self.parse_tuple(),
            RawKind::Word => {
                let tok = self.advance();
                let (pos, text) = (tok.span.start, tok.text.clone());
                self.classify_bare(pos, &text)
            }
            _ => {
                let tok = self.peek();
                Err(self.error(
                    tok.span.start,
                    format!("expected property value, got '{}'", tok.text),
                ))
            }
        }
    }

    /// Classify a bare word the way the grammar's longest-match rules
    /// do: bool and numeric literals first, then dotted words are
    /// references, everything else is text.
    fn classify_bare(&self, pos: usize, word: &str) -> Result<(PropertyKind, Value)> {
        if word == "true" || word == "false" {
            return Ok((PropertyKind::Bool, Value::Bool(word == "true")));
        }
        if let Some(digits) = word.strip_prefix('&') {
            let value = numeric::hex_float(digits)
                .ok_or_else(|| self.error(pos, format!("malformed hex float literal '{word}'")))?;
            return Ok((PropertyKind::Float, Value::Float(value)));
        }
        if looks_numeric(word) {
            if let Ok(n) = word.parse::<i64>() {
                return Ok((PropertyKind::Int, Value::Int(n)));
            }
            if let Ok(f) = word.parse::<f64>() {
                return Ok((PropertyKind::Float, Value::Double(f)));
            }
        }
        if word.contains('.') {
            return Ok((PropertyKind::Reference, Value::Unresolved(word.to_string())));
        }
        Ok((PropertyKind::Text, Value::String(word.to_string())))
    }

    fn parse_tuple(&mut self) -> Result<(PropertyKind, Value)> {
        self.expect(RawKind::LParen)?;
        let mut components = Vec::new();
        loop {
            let tok = self.expect(RawKind::Word)?;
            let (pos, text) = (tok.span.start, tok.text.clone());
            components.push(self.tuple_component(pos, &text)?);
            if self.eat(RawKind::Comma) {
                continue;
            }
            self.expect(RawKind::RParen)?;
            break;
        }

        let value = match components.len() {
            2 => Value::Float2(Float2::new(components[0], components[1])),
            3 => Value::Float3(Float3::new(components[0], components[1], components[2])),
            4 => Value::Float4(Float4::new(
                components[0],
                components[1],
                components[2],
                components[3],
            )),
            _ => Value::List(components.into_iter().map(Value::Float).collect()),
        };
        Ok((PropertyKind::Tuple, value))
    }

    fn tuple_component(&self, pos: usize, word: &str) -> Result<f32> {
        if let Some(digits) = word.strip_prefix('&') {
            return numeric::hex_float(digits)
                .ok_or_else(|| self.error(pos, format!("malformed hex float literal '{word}'")));
        }
        word.parse::<f64>()
            .map(|f| f as f32)
            .map_err(|_| self.error(pos, format!("malformed tuple component '{word}'")))
    }
}

/// A bare word that can only be a numeric literal, never a name.
fn looks_numeric(word: &str) -> bool {
    let rest = word.strip_prefix('-').unwrap_or(word);
    rest.starts_with(|c: char| c.is_ascii_digit())
        && rest
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-'))
}
