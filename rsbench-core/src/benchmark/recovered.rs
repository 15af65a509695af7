//! Recovered Model Parser
//!
//! This module parses the struct definitions printed by a structure recovery tool
//! back into a [`StructGraph`].
//!
//! # Grammar
//! ```text
//! struct <ident> {          open
//! struct <ident>;           forward declaration
//! };                        close
//! <type> <name>;            field, inside a struct only
//! ```
//! Field types: `[u]int{8,16,32,64}_t`, `float`/`f32_t`, `double`/`f64_t`,
//! `<ident>*`, `void*`, or the bare name of an already known struct (embedded).
//! Any line containing `_padding_` is layout filler and is dropped. Inside a struct,
//! `struct <ident> <name>;` is read as an embedded member.
//!
//! Recovered identifiers carry no meaning; each is assigned a local id in order of
//! first mention. A pointer may name a struct declared further down, in which case
//! a placeholder is registered and filled in when its definition arrives.

use crate::benchmark::error::{BenchResult, LineLocation, ParseError};
use crate::benchmark::model::{Field, FieldType, Struct, StructGraph, StructId};
use std::collections::{HashMap, HashSet};

/// Name fragment marking tool-inserted padding members.
const PADDING_MARKER: &str = "_padding_";

/// Prefix of the statistics comment lines some tools print before the model.
const STAT_MARKER: &str = "// ";

/// Classified line of recovery output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    Open(&'a str),
    Declare(&'a str),
    Close,
    Padding,
    Field(FieldToken<'a>, &'a str),
    Other,
}

/// Type token of a field line, before identifiers are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldToken<'a> {
    Primitive(FieldType),
    Pointer(Option<&'a str>),
    Named(&'a str),
}

/// Parser state: the graph built so far plus the identifier registry.
#[derive(Debug)]
pub struct RecoveredParser {
    graph: StructGraph,
    registry: HashMap<String, StructId>,
    defined: HashSet<StructId>,
    current: Option<StructId>,
    next_id: StructId,
}

impl Default for RecoveredParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveredParser {
    pub fn new() -> Self {
        Self {
            graph: StructGraph::new(),
            registry: HashMap::new(),
            defined: HashSet::new(),
            current: None,
            next_id: 1,
        }
    }

    /// Parse a complete tool output.
    pub fn parse(mut self, text: &str) -> BenchResult<StructGraph> {
        for (index, raw) in text.lines().enumerate() {
            self.parse_line(index + 1, raw.trim())?;
        }

        if let Some(open) = self.current {
            return Err(ParseError::UnterminatedStruct {
                name: self.graph.struct_name(open),
            }
            .into());
        }

        for id in self.graph.ids() {
            if !self.defined.contains(&id) {
                log::warn!(
                    "Struct `{}` is referenced but never defined",
                    self.graph.struct_name(id)
                );
            }
        }
        Ok(self.graph)
    }

    fn parse_line(&mut self, number: usize, line: &str) -> BenchResult<()> {
        let location = || LineLocation::new(number, line);

        match classify(line, self.current.is_some()).map_err(|e| e.at(location()))? {
            Line::Open(name) => {
                if let Some(open) = self.current {
                    return Err(ParseError::NestedOpen {
                        open: self.graph.struct_name(open),
                        inner: name.to_string(),
                        location: location(),
                    }
                    .into());
                }
                let id = self.resolve(name);
                if !self.defined.insert(id) {
                    return Err(ParseError::DuplicateStruct {
                        name: name.to_string(),
                        location: location(),
                    }
                    .into());
                }
                self.current = Some(id);
            }
            Line::Declare(name) => {
                self.resolve(name);
            }
            Line::Close => {
                if self.current.take().is_none() {
                    return Err(ParseError::UnmatchedClose {
                        location: location(),
                    }
                    .into());
                }
            }
            Line::Padding => {}
            Line::Field(token, name) => {
                let ty = match token {
                    FieldToken::Primitive(ty) => ty,
                    FieldToken::Pointer(None) => FieldType::Pointer { target: None },
                    FieldToken::Pointer(Some(target)) => FieldType::Pointer {
                        target: Some(self.resolve(target)),
                    },
                    FieldToken::Named(target) => match self.registry.get(target) {
                        Some(&id) => FieldType::EmbeddedStruct { target: id },
                        None => {
                            return Err(ParseError::UnrecognizedField {
                                location: location(),
                            }
                            .into())
                        }
                    },
                };
                if let Some(open) = self.current.and_then(|id| self.graph.get_mut(id)) {
                    open.push_field(Field::new(name, ty));
                }
            }
            Line::Other => {
                log::trace!("Ignoring line {}: {}", number, line);
            }
        }
        Ok(())
    }

    /// Id for `name`, registering a placeholder struct on first mention.
    fn resolve(&mut self, name: &str) -> StructId {
        if let Some(&id) = self.registry.get(name) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.registry.insert(name.to_string(), id);
        self.graph.insert(Struct::new(id, name));
        id
    }
}

/// Parse recovery tool output into a struct graph.
///
/// # Examples
/// ```rust
/// use rsbench_core::benchmark::recovered::parse_recovered;
///
/// let graph = parse_recovered("struct rs_1 {\n    int32_t _0;\n};\n")?;
/// assert_eq!(graph.len(), 1);
/// # Ok::<(), rsbench_core::benchmark::error::BenchError>(())
/// ```
pub fn parse_recovered(text: &str) -> BenchResult<StructGraph> {
    RecoveredParser::new().parse(text)
}

/// Leading `// ` statistics lines of a tool output, marker stripped.
pub fn stat_header(text: &str) -> Vec<&str> {
    text.lines()
        .map_while(|line| line.strip_prefix(STAT_MARKER))
        .collect()
}

/// Line-level failure, located by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFault {
    MalformedOpen,
    UnrecognizedField,
    InvalidWidth(u32),
}

impl LineFault {
    fn at(self, location: LineLocation) -> ParseError {
        match self {
            LineFault::MalformedOpen => ParseError::MalformedOpen { location },
            LineFault::UnrecognizedField => ParseError::UnrecognizedField { location },
            LineFault::InvalidWidth(bits) => ParseError::InvalidWidth { bits, location },
        }
    }
}

fn classify(line: &str, in_struct: bool) -> Result<Line<'_>, LineFault> {
    if line == "};" {
        return Ok(Line::Close);
    }
    if line.is_empty() || line.starts_with("//") {
        return Ok(Line::Other);
    }
    let is_header = line.ends_with('{');
    if in_struct && !is_header && line.contains(PADDING_MARKER) {
        return Ok(Line::Padding);
    }
    if let Some(rest) = line.strip_prefix("struct") {
        if rest.starts_with(char::is_whitespace) {
            let rest = rest.trim();
            // `struct rs_1 _0;` is an elaborated member type, not a header
            if in_struct && !is_header {
                return classify_field(rest);
            }
            return classify_header(rest);
        }
    }
    if !in_struct {
        return Ok(Line::Other);
    }
    classify_field(line)
}

fn classify_header(rest: &str) -> Result<Line<'_>, LineFault> {
    if let Some(name) = rest.strip_suffix('{').map(str::trim_end) {
        if is_identifier(name) {
            return Ok(Line::Open(name));
        }
    } else if let Some(name) = rest.strip_suffix(';').map(str::trim_end) {
        if is_identifier(name) {
            return Ok(Line::Declare(name));
        }
    }
    Err(LineFault::MalformedOpen)
}

fn classify_field(line: &str) -> Result<Line<'_>, LineFault> {
    let decl = line
        .strip_suffix(';')
        .ok_or(LineFault::UnrecognizedField)?
        .trim_end();
    let split = decl
        .rfind(char::is_whitespace)
        .ok_or(LineFault::UnrecognizedField)?;
    let (ty, name) = (decl[..split].trim(), decl[split..].trim());
    if !is_identifier(name) {
        return Err(LineFault::UnrecognizedField);
    }
    Ok(Line::Field(classify_type(ty)?, name))
}

fn classify_type(token: &str) -> Result<FieldToken<'_>, LineFault> {
    match token {
        "float" | "f32_t" => return Ok(FieldToken::Primitive(FieldType::Float { width: 4 })),
        "double" | "f64_t" => return Ok(FieldToken::Primitive(FieldType::Float { width: 8 })),
        _ => {}
    }

    if let Some(pointee) = token.strip_suffix('*').map(str::trim_end) {
        return match pointee {
            "void" => Ok(FieldToken::Pointer(None)),
            name if is_identifier(name) => Ok(FieldToken::Pointer(Some(name))),
            _ => Err(LineFault::UnrecognizedField),
        };
    }

    let (signed, rest) = match token.strip_prefix('u') {
        Some(rest) => (false, rest),
        None => (true, token),
    };
    if let Some(bits) = rest
        .strip_prefix("int")
        .and_then(|r| r.strip_suffix("_t"))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    {
        let bits: u32 = bits.parse().map_err(|_| LineFault::UnrecognizedField)?;
        let width = match bits {
            8 | 16 | 32 | 64 => (bits / 8) as u8,
            _ => return Err(LineFault::InvalidWidth(bits)),
        };
        return Ok(FieldToken::Primitive(if signed {
            FieldType::Int { width }
        } else {
            FieldType::UInt { width }
        }));
    }

    if is_identifier(token) {
        return Ok(FieldToken::Named(token));
    }
    Err(LineFault::UnrecognizedField)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
