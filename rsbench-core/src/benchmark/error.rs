//! Benchmark Error Handling
//!
//! This module provides the error types for generation, recovered-model parsing
//! and evaluation using `thiserror`.
//!
//! # Error Categories
//! - **Generation errors**: struct graph invariants that must hold while building
//! - **Parse errors**: malformed recovery tool output, one variant per pattern
//! - **Evaluation errors**: comparisons that have no defined result
//! - **Configuration errors**: generator settings that cannot produce a program

use thiserror::Error;

/// Result alias used across the core crate.
pub type BenchResult<T> = Result<T, BenchError>;

/// Location of a line in recovery tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLocation {
    /// 1-based line number
    pub line: usize,
    /// Trimmed text of the offending line
    pub text: String,
}

impl LineLocation {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for LineLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: `{}`", self.line, self.text)
    }
}

/// Malformed recovered-model text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// `};` seen while no struct is open.
    #[error("Struct close without a matching open at {location}")]
    UnmatchedClose { location: LineLocation },

    /// `struct X {` seen while `open` is still open.
    #[error("Struct `{inner}` opened inside unclosed struct `{open}` at {location}")]
    NestedOpen {
        open: String,
        inner: String,
        location: LineLocation,
    },

    /// A line starting with `struct` that does not name an identifier followed by `{`.
    #[error("Malformed struct header at {location}")]
    MalformedOpen { location: LineLocation },

    /// A line inside a struct that matches none of the field grammars.
    #[error(
        "Unrecognized field declaration at {location}\nSuggestion: expected `<type> <name>;` \
         with an [u]intN_t, float, double or `<struct>*` type"
    )]
    UnrecognizedField { location: LineLocation },

    /// `[u]intN_t` where N is not 8, 16, 32 or 64.
    #[error("Invalid integer width {bits} at {location}")]
    InvalidWidth { bits: u32, location: LineLocation },

    /// A struct that was already closed is opened again.
    #[error("Struct `{name}` is defined twice, second definition at {location}")]
    DuplicateStruct { name: String, location: LineLocation },

    /// Input ended while a struct was still open.
    #[error("Struct `{name}` is never closed")]
    UnterminatedStruct { name: String },
}

/// Benchmark error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenchError {
    /// A pointer or embedded field needed a referenced struct but none was available.
    ///
    /// Unreachable while the first two structs stay primitive-only, but checked anyway.
    #[error("Generation invariant violated for struct {struct_id}, field {field}: {message}")]
    GenerationInvariantViolation {
        struct_id: u32,
        field: usize,
        message: String,
    },

    /// Recovery tool output could not be parsed.
    #[error("Recovered model parse error: {0}")]
    Parse(#[from] ParseError),

    /// Evaluation was requested against a ground truth with no structs.
    #[error("Cannot evaluate recovery against an empty ground truth")]
    EmptyGroundTruth,

    /// Generator configuration is unusable.
    #[error("Invalid generator configuration: {message}\nSuggestion: {suggestion}")]
    InvalidConfig { message: String, suggestion: String },
}

impl BenchError {
    /// Create a generation invariant error with context.
    #[cold]
    pub fn invariant(struct_id: u32, field: usize, message: impl Into<String>) -> Self {
        Self::GenerationInvariantViolation {
            struct_id,
            field,
            message: message.into(),
        }
    }

    /// Create a configuration error with context.
    #[cold]
    pub fn config(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}
