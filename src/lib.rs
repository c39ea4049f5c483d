//! `lexgen` compiles declarative lexical rules — ordered pairs of a regular
//! expression and an opaque action — into a single deterministic automaton
//! and runs a maximal-munch scanner over it.
//!
//! # Overview
//!
//! Unlike table-driven lexer generators that lean on a general-purpose
//! regex engine at build time, this crate implements the regex-to-DFA
//! pipeline itself: a surface-syntax tokenizer, a shunting-yard
//! infix-to-postfix pass, a marked syntax tree with `nullable`/`firstpos`/
//! `lastpos` attributes, direct (followpos-based) DFA construction with no
//! intermediate NFA, and Hopcroft partition-refinement minimization. Rules
//! are combined into one DFA by tagging each with a private-use-area end
//! marker, so a single automaton walk resolves which rule produced the
//! longest match.
//!
//! # Example
//!
//! ```
//! use lexgen::compiler::{compile, CompileOptions};
//! use lexgen::rule::{Rule, RuleId};
//! use lexgen::scanner::{ActionTable, ScannerRuntime};
//! use std::collections::HashMap;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Token {
//!     Number,
//!     Plus,
//!     Eof,
//! }
//!
//! struct Actions;
//! impl ActionTable<Token> for Actions {
//!     fn dispatch(&self, rule: RuleId, _lexeme: &str) -> Option<Token> {
//!         match rule.0 {
//!             0 => Some(Token::Number),
//!             1 => Some(Token::Plus),
//!             _ => None, // whitespace rule: skip
//!         }
//!     }
//!
//!     fn eof(&self) -> Token {
//!         Token::Eof
//!     }
//! }
//!
//! let rules = vec![
//!     Rule::new(0, 0, "[0-9]+", "NUMBER"),
//!     Rule::new(1, 1, "\\+", "PLUS"),
//!     Rule::new(2, 2, "[ \t]+", "SKIP"),
//! ];
//! let dfa = compile(&rules, CompileOptions::default()).unwrap();
//! let orders: HashMap<RuleId, u32> = rules.iter().map(|r| (r.id, r.order)).collect();
//! let actions = Actions;
//! let runtime = ScannerRuntime::new(&dfa, orders, &actions);
//! let (tokens, errors) = runtime.tokenize::<Token>("12 + 3");
//! assert!(errors.is_empty());
//! assert_eq!(tokens.len(), 4);
//! assert_eq!(tokens.last().unwrap().token, Token::Eof);
//! ```

pub mod code;
pub mod compiler;
pub mod dfa;
pub mod diagnostics;
pub mod error;
pub mod minimize;
pub mod regex_lexer;
pub mod regex_token;
pub mod rule;
pub mod scanner;
pub mod shunting_yard;
pub mod syntax_tree;

pub use code::{Code, Position};
pub use compiler::{compile, CompileOptions, MultiPatternStrategy};
pub use dfa::{Dfa, StateId};
pub use error::{CompileError, LexicalError};
pub use rule::{Rule, RuleId, SpecProducer};
pub use scanner::{ActionTable, Lex, ScannerRuntime};
