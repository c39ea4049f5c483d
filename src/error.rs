//! Error taxonomy for every phase of the compilation pipeline.
//!
//! Each phase surfaces its own error type; [`CompileError`] unifies them for
//! callers that drive the pipeline end to end.

use thiserror::Error;

/// Errors raised while tokenizing surface regex syntax (Phase A).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexLexError {
    #[error("unknown character {0:?} at position {1}")]
    UnknownChar(char, usize),
    #[error("unterminated character class starting at position {0}")]
    UnterminatedClass(usize),
    #[error("unterminated quoted literal starting at position {0}")]
    UnterminatedLiteral(usize),
    #[error("trailing escape at position {0}")]
    TrailingEscape(usize),
}

/// Errors raised while building postfix notation or the syntax tree (Phase B/C).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("malformed postfix expression")]
    MalformedPostfix,
}

/// Errors raised while combining multiple rules into one DFA (Phase F).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("end-marker code point {0:?} collides with the rule alphabet")]
    MarkerCollision(char),
    #[error("no rules supplied to the compiler")]
    EmptyRuleSet,
}

/// Top-level error produced by the compilation pipeline (Phases A through F).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Regex(#[from] RegexLexError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// A recoverable scan-time diagnostic (Phase G). Scanning continues after
/// each one is recorded; it is never propagated as a `Result::Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalError {
    pub position: usize,
    pub offending_code_point: char,
}

impl std::fmt::Display for LexicalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no rule matched {:?} at position {}",
            self.offending_code_point, self.position
        )
    }
}
