//! TOON decoding.
//!
//! Decoding parses the whole document into a tree of borrowed nodes first,
//! then hands that tree to serde. The parse step knows the grammar (headers,
//! rows, blocks); the serde step knows the destination type and coerces each
//! raw literal to the member's kind.
//!
//! ## Leniency
//!
//! In the default [`DecodeMode::Lenient`](crate::DecodeMode::Lenient):
//!
//! - a tabular row whose part count differs from the header is skipped,
//! - a key that names no member of the destination record is skipped,
//! - a line without a `:` in an object block is skipped.
//!
//! Each skip is logged at `debug`. [`DecodeOptions::strict`] turns the three
//! cases into errors.
//!
//! ```rust
//! use serde::Deserialize;
//! use toon_codec::{from_str, from_str_with_options, DecodeOptions, Error};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let text = "[3 x y]\n1,2\n3\n5,6";
//! let points: Vec<Point> = from_str(text).unwrap();
//! assert_eq!(points, vec![Point { x: 1, y: 2 }, Point { x: 5, y: 6 }]);
//!
//! let strict: Result<Vec<Point>, _> = from_str_with_options(text, DecodeOptions::strict());
//! assert!(matches!(strict, Err(Error::FieldCountMismatch { line: 3, .. })));
//! ```

use crate::field::FieldResolver;
use crate::literal::{is_quoted, unquote};
use crate::timestamp::{Timestamp, TIMESTAMP_TOKEN};
use crate::{DecodeOptions, Error, Result};
use serde::de::{
    self, value::BorrowedStrDeserializer, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess,
    SeqAccess, VariantAccess, Visitor,
};
use std::borrow::Cow;
use std::rc::Rc;
use std::str::FromStr;

/// One non-blank input line.
#[derive(Clone, Copy, Debug)]
struct Line<'de> {
    /// 1-based position in the input.
    number: usize,
    indent: usize,
    text: &'de str,
}

/// A raw token and the line it came from.
#[derive(Clone, Copy, Debug)]
struct Literal<'de> {
    text: &'de str,
    line: usize,
}

impl<'de> Literal<'de> {
    fn is_null(&self) -> bool {
        self.text == "null"
    }

    /// The token with quotes removed and escapes resolved.
    fn value(&self) -> Result<Cow<'de, str>> {
        if self.text.starts_with('"') && !is_quoted(self.text) {
            return Err(Error::syntax(self.line, "unterminated quoted literal"));
        }
        Ok(unquote(self.text))
    }
}

#[derive(Debug)]
struct Row<'de> {
    line: usize,
    parts: Vec<&'de str>,
}

#[derive(Debug)]
enum Node<'de> {
    Scalar(Literal<'de>),
    Object {
        line: usize,
        entries: Vec<(Literal<'de>, Node<'de>)>,
    },
    List {
        line: usize,
        items: Vec<Node<'de>>,
    },
    Table {
        line: usize,
        declared: usize,
        fields: Rc<[&'de str]>,
        rows: Vec<Row<'de>>,
    },
    /// A `name:` or `-` line with nothing nested under it.
    Empty { line: usize },
}

impl Node<'_> {
    fn line(&self) -> usize {
        match self {
            Node::Scalar(literal) => literal.line,
            Node::Object { line, .. }
            | Node::List { line, .. }
            | Node::Table { line, .. }
            | Node::Empty { line } => *line,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Node::Scalar(_) => "scalar",
            Node::Object { .. } => "record",
            Node::List { .. } | Node::Table { .. } => "list",
            Node::Empty { .. } => "empty block",
        }
    }
}

fn trim(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r'))
}

fn split_lines(input: &str) -> Vec<Line<'_>> {
    input
        .split('\n')
        .enumerate()
        .filter_map(|(index, raw)| {
            let text = trim(raw);
            if text.is_empty() {
                return None;
            }
            let indent = raw.len() - raw.trim_start_matches([' ', '\t']).len();
            Some(Line {
                number: index + 1,
                indent,
                text,
            })
        })
        .collect()
}

/// Calls `visit` with the byte offset of every `delimiter` that is not inside
/// a quoted literal, until `visit` returns `false`.
fn scan_unquoted(text: &str, delimiter: u8, mut visit: impl FnMut(usize) -> bool) {
    let mut in_quotes = false;
    let mut escaped = false;
    for (at, byte) in text.bytes().enumerate() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_quotes = false;
            }
        } else if byte == b'"' {
            in_quotes = true;
        } else if byte == delimiter && !visit(at) {
            return;
        }
    }
}

/// Position of the first `:` outside quotes.
fn find_separator(text: &str) -> Option<usize> {
    let mut found = None;
    scan_unquoted(text, b':', |at| {
        found = Some(at);
        false
    });
    found
}

/// Splits a tabular row on commas outside quotes and trims each part.
fn split_row(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    scan_unquoted(text, b',', |at| {
        parts.push(trim(&text[start..at]));
        start = at + 1;
        true
    });
    parts.push(trim(&text[start..]));
    parts
}

fn parse_header<'de>(line: &Line<'de>) -> Result<(usize, Vec<&'de str>)> {
    let inner = line
        .text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::malformed_header(line.number, "expected `[count fields...]`"))?;
    let mut tokens = inner.split_whitespace();
    let count = tokens
        .next()
        .ok_or_else(|| Error::malformed_header(line.number, "missing row count"))?;
    let declared = count.parse::<usize>().map_err(|_| {
        Error::malformed_header(
            line.number,
            format!("row count `{count}` is not a non-negative integer"),
        )
    })?;
    Ok((declared, tokens.collect()))
}

fn is_row_line(line: &Line<'_>) -> bool {
    !line.text.starts_with('[') && line.text != "-"
}

/// Deepest nesting of objects and lists the parser accepts.
const MAX_DEPTH: usize = 128;

struct Parser<'de> {
    lines: Vec<Line<'de>>,
    pos: usize,
    depth: usize,
    options: DecodeOptions,
}

impl<'de> Parser<'de> {
    fn new(input: &'de str, options: DecodeOptions) -> Self {
        Parser {
            lines: split_lines(input),
            pos: 0,
            depth: 0,
            options,
        }
    }

    fn peek(&self) -> Option<Line<'de>> {
        self.lines.get(self.pos).copied()
    }

    fn enter(&mut self, line: usize) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::syntax(
                line,
                format!("nesting exceeds {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_document(mut self) -> Result<Node<'de>> {
        let Some(first) = self.peek() else {
            return Ok(Node::Empty { line: 1 });
        };
        let node = if first.text.starts_with('[') {
            tracing::trace!(line = first.number, "document is a list");
            let node = self.parse_list(first)?;
            self.ensure_consumed(&node, first.indent)?;
            node
        } else if self.lines.len() == 1 && find_separator(first.text).is_none() {
            tracing::trace!(line = first.number, "document is a scalar");
            self.pos = 1;
            Node::Scalar(Literal {
                text: first.text,
                line: first.number,
            })
        } else {
            tracing::trace!(line = first.number, "document is an object");
            self.parse_object(0)?
        };

        match self.peek() {
            None => Ok(node),
            Some(extra) => Err(Error::syntax(
                extra.number,
                "unexpected content after the end of the document",
            )),
        }
    }

    /// Fails when rows or items follow a list that already holds its
    /// declared count, instead of leaving them to the enclosing block.
    fn ensure_consumed(&self, node: &Node<'de>, header_indent: usize) -> Result<()> {
        let rest = &self.lines[self.pos..];
        let (line, declared, extra) = match node {
            Node::Table { line, declared, .. } => {
                let extra = rest
                    .iter()
                    .take_while(|l| l.indent >= header_indent && is_row_line(l))
                    .count();
                (*line, *declared, extra)
            }
            Node::List { line, items } => {
                let extra = match rest.first() {
                    Some(next) if next.indent > header_indent => rest
                        .iter()
                        .take_while(|l| l.indent > header_indent)
                        .filter(|l| l.indent == next.indent)
                        .count(),
                    _ => 0,
                };
                (*line, items.len(), extra)
            }
            _ => return Ok(()),
        };
        if extra > 0 {
            return Err(Error::row_count_mismatch(line, declared, declared + extra));
        }
        Ok(())
    }

    /// Members at `min_indent` or deeper, until a shallower line.
    fn parse_object(&mut self, min_indent: usize) -> Result<Node<'de>> {
        let line = self.peek().map_or(1, |l| l.number);
        self.enter(line)?;
        let mut entries = Vec::new();
        while let Some(current) = self.peek() {
            if current.indent < min_indent {
                break;
            }
            self.pos += 1;

            let Some(colon) = find_separator(current.text) else {
                if self.options.is_strict() {
                    return Err(Error::syntax(current.number, "expected `name: value`"));
                }
                tracing::debug!(line = current.number, "skipping line without a key");
                continue;
            };
            let key = Literal {
                text: trim(&current.text[..colon]),
                line: current.number,
            };
            let value = trim(&current.text[colon + 1..]);
            let node = if value.is_empty() {
                self.parse_block(current.indent, current.number)?
            } else {
                Node::Scalar(Literal {
                    text: value,
                    line: current.number,
                })
            };
            entries.push((key, node));
        }
        self.depth -= 1;
        Ok(Node::Object { line, entries })
    }

    /// The lines nested under a `name:` or `-` line at `parent_indent`.
    fn parse_block(&mut self, parent_indent: usize, line: usize) -> Result<Node<'de>> {
        match self.peek() {
            Some(next) if next.indent > parent_indent => {
                if next.text.starts_with('[') {
                    let node = self.parse_list(next)?;
                    self.ensure_consumed(&node, next.indent)?;
                    Ok(node)
                } else {
                    self.parse_object(next.indent)
                }
            }
            _ => Ok(Node::Empty { line }),
        }
    }

    fn parse_list(&mut self, header: Line<'de>) -> Result<Node<'de>> {
        self.pos += 1;
        self.enter(header.number)?;
        let (declared, fields) = parse_header(&header)?;
        let node = if fields.is_empty() {
            self.parse_items(header, declared)?
        } else {
            self.parse_table(header, declared, fields)?
        };
        self.depth -= 1;
        Ok(node)
    }

    fn parse_table(
        &mut self,
        header: Line<'de>,
        declared: usize,
        fields: Vec<&'de str>,
    ) -> Result<Node<'de>> {
        let mut rows = Vec::with_capacity(declared);
        let mut found = 0;
        while found < declared {
            let Some(current) = self.peek() else { break };
            if current.indent < header.indent || !is_row_line(&current) {
                break;
            }
            self.pos += 1;
            found += 1;

            let parts = split_row(current.text);
            if parts.len() != fields.len() {
                if self.options.is_strict() {
                    return Err(Error::field_count_mismatch(
                        current.number,
                        fields.len(),
                        parts.len(),
                    ));
                }
                tracing::debug!(
                    line = current.number,
                    expected = fields.len(),
                    found = parts.len(),
                    "skipping tabular row with mismatched field count"
                );
                continue;
            }
            rows.push(Row {
                line: current.number,
                parts,
            });
        }

        if found != declared {
            return Err(Error::row_count_mismatch(header.number, declared, found));
        }
        Ok(Node::Table {
            line: header.number,
            declared,
            fields: fields.into(),
            rows,
        })
    }

    fn parse_items(&mut self, header: Line<'de>, declared: usize) -> Result<Node<'de>> {
        let mut items = Vec::with_capacity(declared);
        while items.len() < declared {
            let Some(current) = self.peek() else { break };
            if current.indent <= header.indent {
                break;
            }
            let item = if current.text.starts_with('[') {
                self.parse_list(current)?
            } else if current.text == "-" {
                self.pos += 1;
                self.parse_block(current.indent, current.number)?
            } else {
                self.pos += 1;
                Node::Scalar(Literal {
                    text: current.text,
                    line: current.number,
                })
            };
            items.push(item);
        }

        if items.len() != declared {
            return Err(Error::row_count_mismatch(header.number, declared, items.len()));
        }
        Ok(Node::List {
            line: header.number,
            items,
        })
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Deserializes a Rust value from a parsed TOON document.
///
/// The document is parsed when the deserializer is built, so grammar errors
/// surface from [`Deserializer::from_str`] and coercion errors from
/// `T::deserialize`.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use toon_codec::Deserializer;
///
/// let deserializer = Deserializer::from_str("[3]\n  1\n  2\n  3").unwrap();
/// let values = Vec::<u8>::deserialize(deserializer).unwrap();
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
pub struct Deserializer<'de> {
    node: Node<'de>,
    options: DecodeOptions,
}

impl<'de> Deserializer<'de> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Result<Self> {
        Self::with_options(input, DecodeOptions::default())
    }

    pub fn with_options(input: &'de str, options: DecodeOptions) -> Result<Self> {
        let node = Parser::new(input, options).parse_document()?;
        Ok(Deserializer { node, options })
    }

    fn new(node: Node<'de>, options: DecodeOptions) -> Self {
        Deserializer { node, options }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::destination_type(self.node.line(), expected, self.node.kind())
    }

    fn literal(&self, expected: &str) -> Result<Literal<'de>> {
        match &self.node {
            Node::Scalar(literal) => Ok(*literal),
            _ => Err(self.mismatch(expected)),
        }
    }

    fn parse_scalar<T: FromStr>(&self, expected: &str) -> Result<T> {
        let literal = self.literal(expected)?;
        let text = literal.value()?;
        text.parse()
            .map_err(|_| Error::scalar_parse(literal.line, expected, &text))
    }

    fn empty_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_map(ObjectAccess::new(Vec::new(), None, self.options))
    }
}

fn visit_text<'de, V: Visitor<'de>>(literal: Literal<'de>, visitor: V) -> Result<V::Value> {
    match literal.value()? {
        Cow::Borrowed(s) => visitor.visit_borrowed_str(s),
        Cow::Owned(s) => visitor.visit_string(s),
    }
}

/// Infers a kind for a literal when the destination does not name one.
fn visit_untyped<'de, V: Visitor<'de>>(literal: Literal<'de>, visitor: V) -> Result<V::Value> {
    if literal.text.starts_with('"') {
        return visit_text(literal, visitor);
    }
    match literal.text {
        "null" => return visitor.visit_unit(),
        "true" => return visitor.visit_bool(true),
        "false" => return visitor.visit_bool(false),
        _ => {}
    }
    if let Ok(i) = literal.text.parse::<i64>() {
        return visitor.visit_i64(i);
    }
    if let Ok(f) = literal.text.parse::<f64>() {
        return visitor.visit_f64(f);
    }
    visitor.visit_borrowed_str(literal.text)
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                visitor.$visit(self.parse_scalar::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let options = self.options;
        match self.node {
            Node::Scalar(literal) => visit_untyped(literal, visitor),
            Node::Object { entries, .. } => {
                visitor.visit_map(ObjectAccess::new(entries, None, options))
            }
            Node::List { items, .. } => visitor.visit_seq(ListAccess::new(items, options)),
            Node::Table { fields, rows, .. } => {
                visitor.visit_seq(TableAccess::new(fields, rows, options))
            }
            Node::Empty { .. } => visitor.visit_map(ObjectAccess::new(Vec::new(), None, options)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let literal = self.literal("bool")?;
        let text = literal.value()?;
        match parse_bool(&text) {
            Some(b) => visitor.visit_bool(b),
            None => Err(Error::scalar_parse(literal.line, "bool", &text)),
        }
    }

    deserialize_number! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let literal = self.literal("char")?;
        let text = literal.value()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::scalar_parse(literal.line, "char", &text)),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.node {
            Node::Scalar(literal) => visit_text(literal, visitor),
            Node::Empty { .. } => visitor.visit_borrowed_str(""),
            _ => Err(self.mismatch("string")),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if matches!(&self.node, Node::Scalar(literal) if literal.is_null()) {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match &self.node {
            Node::Scalar(literal) if literal.is_null() => visitor.visit_unit(),
            Node::Empty { .. } => visitor.visit_unit(),
            node => Err(Error::destination_type(node.line(), "null", node.kind())),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name != TIMESTAMP_TOKEN {
            return visitor.visit_newtype_struct(self);
        }
        let literal = self.literal("timestamp")?;
        let text = literal.value()?;
        if Timestamp::parse(&text).is_err() {
            return Err(Error::scalar_parse(literal.line, "timestamp", &text));
        }
        visitor.visit_str(&text)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let options = self.options;
        match self.node {
            Node::List { items, .. } => visitor.visit_seq(ListAccess::new(items, options)),
            Node::Table { fields, rows, .. } => {
                visitor.visit_seq(TableAccess::new(fields, rows, options))
            }
            Node::Empty { .. } => visitor.visit_seq(ListAccess::new(Vec::new(), options)),
            _ => Err(self.mismatch("list")),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let options = self.options;
        match self.node {
            Node::Object { entries, .. } => {
                visitor.visit_map(ObjectAccess::new(entries, None, options))
            }
            Node::Empty { .. } => self.empty_map(visitor),
            _ => Err(self.mismatch("map")),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let options = self.options;
        match self.node {
            Node::Object { entries, .. } => visitor.visit_map(ObjectAccess::new(
                entries,
                Some(FieldResolver::new(fields)),
                options,
            )),
            Node::Empty { .. } => self.empty_map(visitor),
            Node::Scalar(literal) if !options.is_strict() => {
                tracing::debug!(line = literal.line, record = name, "reading scalar document as empty record");
                self.empty_map(visitor)
            }
            _ => Err(self.mismatch("record")),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let options = self.options;
        match self.node {
            Node::Scalar(literal) => {
                let variant = literal.value()?.into_owned();
                visitor.visit_enum(variant.into_deserializer())
            }
            Node::Object { mut entries, .. } if entries.len() == 1 => {
                let (name, content) = entries.remove(0);
                visitor.visit_enum(Variant {
                    name,
                    content,
                    options,
                })
            }
            _ => Err(self.mismatch("enum")),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

struct ObjectAccess<'de> {
    entries: std::vec::IntoIter<(Literal<'de>, Node<'de>)>,
    /// Present when the destination is a record with a fixed member table.
    resolver: Option<FieldResolver>,
    value: Option<Node<'de>>,
    options: DecodeOptions,
}

impl<'de> ObjectAccess<'de> {
    fn new(
        entries: Vec<(Literal<'de>, Node<'de>)>,
        resolver: Option<FieldResolver>,
        options: DecodeOptions,
    ) -> Self {
        ObjectAccess {
            entries: entries.into_iter(),
            resolver,
            value: None,
            options,
        }
    }
}

impl<'de> MapAccess<'de> for ObjectAccess<'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        for (key, node) in self.entries.by_ref() {
            let Some(resolver) = &self.resolver else {
                self.value = Some(node);
                return seed
                    .deserialize(Deserializer::new(Node::Scalar(key), self.options))
                    .map(Some);
            };

            let wire = key.value()?;
            match resolver.resolve(&wire) {
                Some(declared) => {
                    self.value = Some(node);
                    return seed
                        .deserialize(BorrowedStrDeserializer::<Error>::new(declared))
                        .map(Some);
                }
                None if self.options.is_strict() => {
                    return Err(Error::unknown_field(key.line, &wire));
                }
                None => {
                    tracing::debug!(line = key.line, field = %wire, "skipping unknown field");
                }
            }
        }
        Ok(None)
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<S::Value> {
        let node = self
            .value
            .take()
            .ok_or_else(|| Error::custom("value requested before its key"))?;
        seed.deserialize(Deserializer::new(node, self.options))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct ListAccess<'de> {
    items: std::vec::IntoIter<Node<'de>>,
    options: DecodeOptions,
}

impl<'de> ListAccess<'de> {
    fn new(items: Vec<Node<'de>>, options: DecodeOptions) -> Self {
        ListAccess {
            items: items.into_iter(),
            options,
        }
    }
}

impl<'de> SeqAccess<'de> for ListAccess<'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        self.items
            .next()
            .map(|node| seed.deserialize(Deserializer::new(node, self.options)))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Presents each tabular row as a record keyed by the header's fields.
struct TableAccess<'de> {
    fields: Rc<[&'de str]>,
    rows: std::vec::IntoIter<Row<'de>>,
    options: DecodeOptions,
}

impl<'de> TableAccess<'de> {
    fn new(fields: Rc<[&'de str]>, rows: Vec<Row<'de>>, options: DecodeOptions) -> Self {
        TableAccess {
            fields,
            rows: rows.into_iter(),
            options,
        }
    }
}

impl<'de> SeqAccess<'de> for TableAccess<'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        let Some(row) = self.rows.next() else {
            return Ok(None);
        };
        let line = row.line;
        let entries = self
            .fields
            .iter()
            .zip(row.parts)
            .map(|(&field, part)| {
                (
                    Literal { text: field, line },
                    Node::Scalar(Literal { text: part, line }),
                )
            })
            .collect();
        seed.deserialize(Deserializer::new(Node::Object { line, entries }, self.options))
            .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.rows.len())
    }
}

/// An enum encoded as a single-entry object: `Variant: content`.
struct Variant<'de> {
    name: Literal<'de>,
    content: Node<'de>,
    options: DecodeOptions,
}

impl<'de> EnumAccess<'de> for Variant<'de> {
    type Error = Error;
    type Variant = VariantContent<'de>;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self::Variant)> {
        let variant = seed.deserialize(Deserializer::new(Node::Scalar(self.name), self.options))?;
        Ok((
            variant,
            VariantContent(Deserializer::new(self.content, self.options)),
        ))
    }
}

struct VariantContent<'de>(Deserializer<'de>);

impl<'de> VariantAccess<'de> for VariantContent<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        de::Deserialize::deserialize(self.0)
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.0)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(self.0, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(self.0, "", fields, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, from_str_with_options, ToonValue};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_split_lines_tracks_numbers_and_indent() {
        let lines = split_lines("a: 1\n\n  b: 2\r\n\t\n");
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].number, lines[0].indent, lines[0].text), (1, 0, "a: 1"));
        assert_eq!((lines[1].number, lines[1].indent, lines[1].text), (3, 2, "b: 2"));
    }

    #[test]
    fn test_split_row_respects_quotes() {
        assert_eq!(split_row("1, a ,b"), ["1", "a", "b"]);
        assert_eq!(split_row(r#"1,"x, y",z"#), ["1", r#""x, y""#, "z"]);
        assert_eq!(split_row(r#""a\",b",c"#), [r#""a\",b""#, "c"]);
        assert_eq!(split_row("a,"), ["a", ""]);
    }

    #[test]
    fn test_find_separator_skips_quoted_colons() {
        assert_eq!(find_separator("name: x"), Some(4));
        assert_eq!(find_separator(r#""a:b": c"#), Some(5));
        assert_eq!(find_separator(r#""a:b""#), None);
    }

    #[test]
    fn test_header_errors() {
        let err = from_str::<Vec<Point>>("[2 x y\n1,2\n3,4").unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { line: 1, .. }));

        let err = from_str::<Vec<Point>>("[]").unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { .. }));

        let err = from_str::<Vec<Point>>("[-1 x y]").unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { .. }));
    }

    #[test]
    fn test_row_count_must_match() {
        let err = from_str::<Vec<Point>>("[3 x y]\n1,2\n3,4").unwrap_err();
        assert_eq!(err, Error::row_count_mismatch(1, 3, 2));

        let err = from_str::<Vec<Point>>("[1 x y]\n1,2\n3,4").unwrap_err();
        assert_eq!(err, Error::row_count_mismatch(1, 1, 2));

        let err = from_str::<Vec<i32>>("[3]\n  1\n  2").unwrap_err();
        assert_eq!(err, Error::row_count_mismatch(1, 3, 2));
    }

    #[test]
    fn test_nesting_depth_is_capped() {
        let nested = |levels: usize| -> String {
            (0..levels).map(|d| format!("{}a:\n", " ".repeat(d))).collect()
        };
        assert!(from_str::<ToonValue>(&nested(100)).is_ok());

        let err = from_str::<ToonValue>(&nested(200)).unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 129, .. }), "{err}");

        let lists: String = (0..200).map(|d| format!("{}[1]\n", " ".repeat(d))).collect();
        let err = from_str::<ToonValue>(&lists).unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 129, .. }), "{err}");
    }

    #[test]
    fn test_skipped_rows_still_count() {
        let points: Vec<Point> = from_str("[2 x y]\n1\n3,4").unwrap();
        assert_eq!(points, vec![Point { x: 3, y: 4 }]);
    }

    #[test]
    fn test_scalar_parse_names_line() {
        let err = from_str::<Point>("x: 1\ny: two").unwrap_err();
        assert_eq!(err, Error::scalar_parse(2, "i32", "two"));

        let err = from_str::<Vec<Point>>("[1 x y]\n1,999999999999").unwrap_err();
        assert!(matches!(err, Error::ScalarParse { line: 2, .. }));
    }

    #[test]
    fn test_destination_type_mismatch() {
        let err = from_str::<Vec<i32>>("a: 1").unwrap_err();
        assert!(matches!(err, Error::DestinationType { .. }));

        let err = from_str::<i32>("[1]\n  1").unwrap_err();
        assert!(matches!(err, Error::DestinationType { line: 1, .. }));
    }

    #[test]
    fn test_bool_literal_forms() {
        for text in ["true", "1", "t", "T", "TRUE", "True"] {
            assert!(from_str::<bool>(text).unwrap(), "{text}");
        }
        for text in ["false", "0", "f", "F", "FALSE", "False"] {
            assert!(!from_str::<bool>(text).unwrap(), "{text}");
        }
        assert!(matches!(
            from_str::<bool>("yes"),
            Err(Error::ScalarParse { .. })
        ));
    }

    #[test]
    fn test_unknown_fields() {
        let point: Point = from_str("x: 1\nz: 9\ny: 2").unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });

        let err = from_str_with_options::<Point>("x: 1\nz: 9\ny: 2", DecodeOptions::strict())
            .unwrap_err();
        assert_eq!(err, Error::unknown_field(2, "z"));
    }

    #[test]
    fn test_lines_without_key_are_skipped() {
        let point: Point = from_str("x: 1\nstray\ny: 2").unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
        assert!(matches!(
            from_str_with_options::<Point>("x: 1\nstray\ny: 2", DecodeOptions::strict()),
            Err(Error::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = from_str::<String>("\"open").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_trailing_content_after_list() {
        let err = from_str::<Vec<i32>>("[1]\n  1\n[1]\n  2").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 3, .. }));
    }

    #[test]
    fn test_empty_block_defaults() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Holder {
            name: String,
            tags: Vec<String>,
            meta: BTreeMap<String, String>,
        }
        let holder: Holder = from_str("name:\ntags:\nmeta:").unwrap();
        assert_eq!(holder.name, "");
        assert!(holder.tags.is_empty());
        assert!(holder.meta.is_empty());
    }

    #[test]
    fn test_untyped_inference() {
        let value: ToonValue = from_str("[5]\n  null\n  true\n  -3\n  2.5\n  \"4\"").unwrap();
        assert_eq!(
            value,
            ToonValue::List(vec![
                ToonValue::Null,
                ToonValue::Bool(true),
                ToonValue::Int(-3),
                ToonValue::Float(2.5),
                ToonValue::String("4".into()),
            ])
        );
    }

    #[test]
    fn test_borrowed_strings() {
        #[derive(Deserialize)]
        struct Borrowed<'a> {
            name: &'a str,
        }
        let input = "name: Alice";
        let value: Borrowed<'_> = from_str(input).unwrap();
        assert_eq!(value.name, "Alice");
    }

    #[test]
    fn test_empty_document() {
        let map: BTreeMap<String, i32> = from_str("").unwrap();
        assert!(map.is_empty());
        let list: Vec<i32> = from_str("\n\n").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_enum_forms() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Shape {
            Empty,
            Circle(f64),
            Pair(i32, i32),
            Rect { w: u8, h: u8 },
        }
        assert_eq!(from_str::<Shape>("Empty").unwrap(), Shape::Empty);
        assert_eq!(from_str::<Shape>("Circle: 1.5").unwrap(), Shape::Circle(1.5));
        assert_eq!(
            from_str::<Shape>("Pair:\n  [2]\n    1\n    2").unwrap(),
            Shape::Pair(1, 2)
        );
        assert_eq!(
            from_str::<Shape>("Rect:\n  w: 2\n  h: 3").unwrap(),
            Shape::Rect { w: 2, h: 3 }
        );
    }
}
