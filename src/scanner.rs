//! Phase G: maximal-munch scanning with priority tiebreak over a compiled
//! (multi-pattern) DFA.

use std::collections::HashMap;

use crate::compiler::resolve_rule;
use crate::dfa::Dfa;
use crate::error::LexicalError;
use crate::rule::RuleId;

/// Per-rule dispatch: given the rule that matched and the matched lexeme,
/// produce either a token (`Some`) or signal that the rule is a skip rule
/// (`None`, e.g. whitespace). The action's own encoding is opaque to the
/// scanner; this crate only calls it by rule id.
pub trait ActionTable<T> {
    fn dispatch(&self, rule: RuleId, lexeme: &str) -> Option<T>;

    /// The synthetic end-of-input token appended after the last real match.
    fn eof(&self) -> T;
}

/// A matched token and the byte-free, code-point span it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lex<T> {
    pub token: T,
    pub start: usize,
    pub end: usize,
}

pub struct ScannerRuntime<'a, A> {
    dfa: &'a Dfa,
    orders: HashMap<RuleId, u32>,
    actions: &'a A,
}

impl<'a, A> ScannerRuntime<'a, A> {
    pub fn new(dfa: &'a Dfa, orders: HashMap<RuleId, u32>, actions: &'a A) -> Self {
        Self { dfa, orders, actions }
    }

    /// Tokenize `input` to completion, collecting both the emitted tokens
    /// and any recovered lexical errors, in left-to-right emission order.
    /// The returned stream always ends with a synthetic EOF token, even for
    /// empty input.
    pub fn tokenize<T>(&self, input: &str) -> (Vec<Lex<T>>, Vec<LexicalError>)
    where
        A: ActionTable<T>,
    {
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0usize;
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        while pos < chars.len() {
            match self.step(&chars, pos) {
                Step::Matched { lexeme_end, rule } => {
                    let lexeme: String = chars[pos..lexeme_end].iter().collect();
                    if let Some(token) = self.actions.dispatch(rule, &lexeme) {
                        tokens.push(Lex {
                            token,
                            start: pos,
                            end: lexeme_end,
                        });
                    }
                    pos = lexeme_end;
                }
                Step::NoMatch => {
                    let offending_code_point = chars[pos];
                    tracing::warn!(
                        phase = crate::diagnostics::PHASE_G_SCANNER,
                        position = pos,
                        ?offending_code_point,
                        "lexical error, skipping one code point"
                    );
                    errors.push(LexicalError {
                        position: pos,
                        offending_code_point,
                    });
                    pos += 1;
                }
            }
        }

        tracing::trace!(phase = crate::diagnostics::PHASE_G_SCANNER, position = pos, "emitting EOF");
        tokens.push(Lex {
            token: self.actions.eof(),
            start: pos,
            end: pos,
        });

        (tokens, errors)
    }

    /// Run the maximal-munch loop once from `pos`, returning the longest
    /// accepted prefix and the rule that owns it, or `NoMatch`.
    fn step(&self, chars: &[char], pos: usize) -> Step {
        let mut cur = self.dfa.initial;
        let mut last_accept: Option<(usize, RuleId)> = None;
        let mut i = pos;

        loop {
            if i < chars.len() {
                if let Some(next) = self.dfa.transition(cur, chars[i]) {
                    cur = next;
                    i += 1;
                    if self.dfa.is_accepting(cur) {
                        if let Some(rule) = resolve_rule(self.dfa, cur, &self.orders) {
                            last_accept = Some((i, rule));
                        }
                    }
                    continue;
                }
            }
            break;
        }

        match last_accept {
            Some((lexeme_end, rule)) => Step::Matched { lexeme_end, rule },
            None => Step::NoMatch,
        }
    }
}

enum Step {
    Matched { lexeme_end: usize, rule: RuleId },
    NoMatch,
}
