//! Annotated map-file grammar — lexer and recursive descent parser for
//! `.mbd`/`.aux`/`.base`/`.desc` sources.
//!
//! Every declaration is explicitly kind-tagged (`u8 … s64`, `token`,
//! `string`, `float`, `fixed2/fixed3/float4/quaternion`, `struct`,
//! `array_float`, `array_struct`), so the parser dispatches on the
//! leading keyword.

use std::path::Path;

use crate::model::{Float2, Float3, Float4, Quaternion, Value};
use crate::{Error, Result};

use super::numeric;
use super::{Property, PropertyKind, PropertyValue, Span, line_at};

/// Parse a complete annotated map file into properties, in source order.
pub fn parse_map(source: &str, path: &Path) -> Result<Vec<Property>> {
    let tokens = lex(source, path)?;
    let mut parser = Parser { tokens: &tokens, pos: 0, source, path };

    // Optional literal header tag.
    if parser.at_word("SCSAnnotatedFileV1") {
        parser.advance();
    }

    let mut properties = Vec::new();
    while !parser.at(RawKind::Eof) {
        properties.push(parser.parse_entry()?);
    }
    Ok(properties)
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawKind {
    /// Bare run of `[A-Za-z0-9_&-]` — keywords, identifiers and
    /// numeric literals (`x`-hex, `i`-fixed, `&`-hex, decimal).
    Word,
    Str,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
struct RawToken {
    kind: RawKind,
    span: Span,
    text: String,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '&')
}

fn lex(input: &str, path: &Path) -> Result<Vec<RawToken>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
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
                            return Err(Error::Syntax {
                                path: path.to_path_buf(),
                                line: line_at(input, pos).to_string(),
                                message: "unterminated string literal".into(),
                            });
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

            '{' => punct(&mut tokens, &mut chars, RawKind::LBrace, pos),
            '}' => punct(&mut tokens, &mut chars, RawKind::RBrace, pos),
            '[' => punct(&mut tokens, &mut chars, RawKind::LBracket, pos),
            ']' => punct(&mut tokens, &mut chars, RawKind::RBracket, pos),
            ':' => punct(&mut tokens, &mut chars, RawKind::Colon, pos),

            other => {
                return Err(Error::Syntax {
                    path: path.to_path_buf(),
                    line: line_at(input, pos).to_string(),
                    message: format!("unexpected character '{other}'"),
                });
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
) {
    chars.next();
    tokens.push(RawToken {
        kind,
        span: Span { start: pos, end: pos + 1 },
        text: String::new(),
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

    fn at_word(&self, text: &str) -> bool {
        self.at(RawKind::Word) && self.peek().text == text
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

    fn parse_entry(&mut self) -> Result<Property> {
        let keyword_tok = self.expect(RawKind::Word)?;
        let keyword_pos = keyword_tok.span.start;
        let keyword = keyword_tok.text.clone();

        if let Some(int_kind) = integer_kind(&keyword) {
            let identifier = self.expect(RawKind::Word)?.text.clone();
            self.expect(RawKind::Colon)?;
            let tok = self.expect(RawKind::Word)?;
            let (pos, literal) = (tok.span.start, tok.text.clone());
            let raw = self.integer_literal(pos, &literal)?;
            return Ok(Property::scalar(int_kind, identifier, width_value(int_kind, raw)));
        }

        match keyword.as_str() {
            "token" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::Colon)?;
                let text = self.expect(RawKind::Str)?.text.clone();
                // An interned-string reference, resolved post-merge.
                Ok(Property::scalar(
                    PropertyKind::Token,
                    identifier,
                    Value::Unresolved(text),
                ))
            }

            "string" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::Colon)?;
                let text = self.expect(RawKind::Str)?.text.clone();
                // Plain text, unlike `token` which is a reference.
                Ok(Property::scalar(
                    PropertyKind::String,
                    identifier,
                    Value::String(text),
                ))
            }

            "float" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::Colon)?;
                let value = self.float_literal()?;
                Ok(Property::scalar(PropertyKind::Float, identifier, Value::Float(value)))
            }

            "fixed2" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::Colon)?;
                let v = [self.float_literal()?, self.float_literal()?];
                Ok(Property::scalar(
                    PropertyKind::Fixed2,
                    identifier,
                    Value::Float2(Float2::from(v)),
                ))
            }

            "fixed3" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::Colon)?;
                let v = [
                    self.float_literal()?,
                    self.float_literal()?,
                    self.float_literal()?,
                ];
                Ok(Property::scalar(
                    PropertyKind::Fixed3,
                    identifier,
                    Value::Float3(Float3::from(v)),
                ))
            }

            "float4" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::Colon)?;
                let v = [
                    self.float_literal()?,
                    self.float_literal()?,
                    self.float_literal()?,
                    self.float_literal()?,
                ];
                Ok(Property::scalar(
                    PropertyKind::Float4,
                    identifier,
                    Value::Float4(Float4::from(v)),
                ))
            }

            "quaternion" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::Colon)?;
                // Literal order is w x y z.
                let v = [
                    self.float_literal()?,
                    self.float_literal()?,
                    self.float_literal()?,
                    self.float_literal()?,
                ];
                Ok(Property::scalar(
                    PropertyKind::Quaternion,
                    identifier,
                    Value::Quaternion(Quaternion::from(v)),
                ))
            }

            "struct" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                let members = self.parse_struct_members()?;
                Ok(Property {
                    kind: PropertyKind::Struct,
                    identifier,
                    value: PropertyValue::Struct(members),
                })
            }

            "array_float" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::LBracket)?;
                let mut items = Vec::new();
                while !self.eat(RawKind::RBracket) {
                    items.push(Value::Float(self.float_literal()?));
                }
                Ok(Property::scalar(PropertyKind::ArrayFloat, identifier, Value::List(items)))
            }

            "array_struct" => {
                let identifier = self.expect(RawKind::Word)?.text.clone();
                self.expect(RawKind::LBracket)?;
                let mut groups = Vec::new();
                while !self.eat(RawKind::RBracket) {
                    // Each element is an anonymous struct: the element
                    // name is syntax only and discarded.
                    let tok = self.expect(RawKind::Word)?;
                    if tok.text != "struct" {
                        let (pos, text) = (tok.span.start, tok.text.clone());
                        return Err(self.error(
                            pos,
                            format!("expected struct element in array_struct, got '{text}'"),
                        ));
                    }
                    self.expect(RawKind::Word)?;
                    groups.push(self.parse_struct_members()?);
                }
                Ok(Property {
                    kind: PropertyKind::ArrayStruct,
                    identifier,
                    value: PropertyValue::StructList(groups),
                })
            }

            other => Err(self.error(
                keyword_pos,
                format!("unknown declaration kind '{other}'"),
            )),
        }
    }

    fn parse_struct_members(&mut self) -> Result<Vec<Property>> {
        self.expect(RawKind::LBrace)?;
        let mut members = Vec::new();
        while !self.eat(RawKind::RBrace) {
            if self.at(RawKind::Eof) {
                let pos = self.peek().span.start;
                return Err(self.error(pos, "unterminated struct".into()));
            }
            members.push(self.parse_entry()?);
        }
        Ok(members)
    }

    /// Decimal, `x`-hex (padded little-endian u64), or `i`-decimal.
    /// Widened to i128 so a full-range u64 and negative decimals share
    /// one representation before the width cast.
    fn integer_literal(&self, pos: usize, literal: &str) -> Result<i128> {
        if let Some(digits) = literal.strip_prefix('x') {
            let value = numeric::hex_u64(digits).ok_or_else(|| {
                self.error(pos, format!("malformed hex integer literal '{literal}'"))
            })?;
            return Ok(i128::from(value));
        }
        if let Some(digits) = literal.strip_prefix('i') {
            let value: i64 = digits.parse().map_err(|_| {
                self.error(pos, format!("malformed integer literal '{literal}'"))
            })?;
            return Ok(i128::from(value));
        }
        literal
            .parse::<i64>()
            .map(i128::from)
            .map_err(|_| self.error(pos, format!("malformed integer literal '{literal}'")))
    }

    /// `&`-hex single or `i`-prefixed fixed-point (n / 256).
    fn float_literal(&mut self) -> Result<f32> {
        let tok = self.expect(RawKind::Word)?;
        let (pos, literal) = (tok.span.start, tok.text.clone());
        if let Some(digits) = literal.strip_prefix('&') {
            return numeric::hex_float(digits).ok_or_else(|| {
                self.error(pos, format!("malformed hex float literal '{literal}'"))
            });
        }
        if let Some(digits) = literal.strip_prefix('i') {
            return numeric::fixed_point(digits).ok_or_else(|| {
                self.error(pos, format!("malformed fixed-point literal '{literal}'"))
            });
        }
        Err(self.error(pos, format!("malformed float literal '{literal}'")))
    }
}

fn integer_kind(keyword: &str) -> Option<PropertyKind> {
    match keyword {
        "u8" => Some(PropertyKind::U8),
        "u16" => Some(PropertyKind::U16),
        "s16" => Some(PropertyKind::S16),
        "u32" => Some(PropertyKind::U32),
        "s32" => Some(PropertyKind::S32),
        "u64" => Some(PropertyKind::U64),
        "s64" => Some(PropertyKind::S64),
        _ => None,
    }
}

/// Truncating width cast, matching the fixed-width ctypes constructors
/// of the original format definition.
fn width_value(kind: PropertyKind, raw: i128) -> Value {
    match kind {
        PropertyKind::U8 => Value::U8(raw as u8),
        PropertyKind::U16 => Value::U16(raw as u16),
        PropertyKind::S16 => Value::S16(raw as i16),
        PropertyKind::U32 => Value::U32(raw as u32),
        PropertyKind::S32 => Value::S32(raw as i32),
        PropertyKind::U64 => Value::U64(raw as u64),
        PropertyKind::S64 => Value::S64(raw as i64),
        _ => unreachable!("width_value called for non-integer kind"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Vec<Property> {
        parse_map(src, Path::new("test.base")).unwrap()
    }

    #[test]
    fn test_scalar_declarations() {
        let properties = parse(
            r#"
            SCSAnnotatedFileV1
            u8 type_info: 17
            u16 right_terrain_size: 500
            s32 right_road_height: -33
            u64 node0_uid: x7EC4DD7E7A00000
            token road_look: "look24"
            float right_profile_coef: &3f800000 # 1
            fixed3 position: i99088 i-2 i93331
            quaternion rotation: &bf78fd43 &b8d810bb &3e6e00b0 &b7ce87fd
            "#,
        );
        assert_eq!(
            properties,
            vec![
                Property::scalar(PropertyKind::U8, "type_info", Value::U8(17)),
                Property::scalar(PropertyKind::U16, "right_terrain_size", Value::U16(500)),
                Property::scalar(PropertyKind::S32, "right_road_height", Value::S32(-33)),
                Property::scalar(PropertyKind::U64, "node0_uid", Value::U64(526114473086)),
                Property::scalar(
                    PropertyKind::Token,
                    "road_look",
                    Value::Unresolved("look24".into()),
                ),
                Property::scalar(PropertyKind::Float, "right_profile_coef", Value::Float(1.0)),
                Property::scalar(
                    PropertyKind::Fixed3,
                    "position",
                    Value::Float3(Float3::new(387.0625, -0.0078125, 364.57422)),
                ),
                Property::scalar(
                    PropertyKind::Quaternion,
                    "rotation",
                    Value::Quaternion(Quaternion::new(
                        -0.97261447,
                        -0.000103027989,
                        0.2324245,
                        -2.4620438e-5,
                    )),
                ),
            ],
        );
    }

    #[test]
    fn test_struct_declaration() {
        let properties = parse(
            r#"
            struct node_item {
                u64 uid: x7EC4DD453100000
                u32 flags: 1
            }
            "#,
        );
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].kind, PropertyKind::Struct);
        assert_eq!(properties[0].identifier, "node_item");
        let PropertyValue::Struct(members) = &properties[0].value else {
            panic!("expected struct members");
        };
        assert_eq!(
            members,
            &vec![
                Property::scalar(PropertyKind::U64, "uid", Value::U64(211625559166)),
                Property::scalar(PropertyKind::U32, "flags", Value::U32(1)),
            ],
        );
    }

    #[test]
    fn test_array_float_declaration() {
        let properties = parse(
            r#"
            array_float minimums [
                &43a95780 # 338.684
                &c1780000 # -15.5
            ]
            "#,
        );
        assert_eq!(
            properties,
            vec![Property::scalar(
                PropertyKind::ArrayFloat,
                "minimums",
                Value::List(vec![Value::Float(338.68359), Value::Float(-15.5)]),
            )],
        );
    }

    #[test]
    fn test_array_struct_elements_are_anonymous() {
        let properties = parse(
            r#"
            array_struct right_vegetation [
                struct vegetation {
                    token vegetation: "grass"
                    u16 density: 4000
                }
                struct vegetation {
                    token vegetation: "corn"
                    u16 density: 8000
                }
            ]
            "#,
        );
        assert_eq!(properties.len(), 1);
        let PropertyValue::StructList(groups) = &properties[0].value else {
            panic!("expected struct list");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[1],
            vec![
                Property::scalar(
                    PropertyKind::Token,
                    "vegetation",
                    Value::Unresolved("corn".into()),
                ),
                Property::scalar(PropertyKind::U16, "density", Value::U16(8000)),
            ],
        );
    }

    #[test]
    fn test_string_declaration_is_plain_text() {
        let properties = parse(
            r#"
            string override_template: "none"
            token road_look: "look24"
            "#,
        );
        // `string` stays text while `token` becomes a reference.
        assert_eq!(
            properties,
            vec![
                Property::scalar(
                    PropertyKind::String,
                    "override_template",
                    Value::String("none".into()),
                ),
                Property::scalar(
                    PropertyKind::Token,
                    "road_look",
                    Value::Unresolved("look24".into()),
                ),
            ],
        );
    }

    #[test]
    fn test_unknown_keyword_is_fatal() {
        let err = parse_map("f32 size: &3f800000", Path::new("bad.aux")).unwrap_err();
        match err {
            Error::Syntax { path, line, message } => {
                assert_eq!(path, Path::new("bad.aux"));
                assert_eq!(line, "f32 size: &3f800000");
                assert!(message.contains("f32"));
            }
            other => panic!("expected Syntax, got {other:?}"),
        }
    }

    #[test]
    fn test_decimal_float_is_rejected() {
        // Map floats are only &-hex or i-fixed-point.
        assert!(parse_map("float coef: 1.5", Path::new("bad.aux")).is_err());
    }
}
