//! End-to-end scanning scenarios, one rule set per scenario.

use std::collections::HashMap;

use lexgen::compiler::{compile, CompileOptions};
use lexgen::rule::{Rule, RuleId};
use lexgen::scanner::{ActionTable, ScannerRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number,
    Plus,
    Id,
    If,
    Eq,
    Assign,
    Eof,
}

struct Actions(HashMap<u32, Token>);

impl ActionTable<Token> for Actions {
    fn dispatch(&self, rule: RuleId, _lexeme: &str) -> Option<Token> {
        self.0.get(&rule.0).copied()
    }

    fn eof(&self) -> Token {
        Token::Eof
    }
}

fn run(rules: &[Rule], dispatch: &[(u32, Token)], input: &str) -> Vec<(Token, String)> {
    let dfa = compile(rules, CompileOptions::default()).expect("rules compile");
    let orders: HashMap<RuleId, u32> = rules.iter().map(|r| (r.id, r.order)).collect();
    let actions = Actions(dispatch.iter().cloned().collect());
    let runtime = ScannerRuntime::new(&dfa, orders, &actions);
    let chars: Vec<char> = input.chars().collect();
    let (tokens, errors) = runtime.tokenize::<Token>(input);
    assert!(errors.is_empty(), "unexpected lexical errors: {errors:?}");
    tokens
        .into_iter()
        .map(|t| (t.token, chars[t.start..t.end].iter().collect()))
        .collect()
}

#[test]
fn numbers_plus_and_skipped_whitespace() {
    let rules = vec![
        Rule::new(0, 0, "[0-9]+", "NUMBER"),
        Rule::new(1, 1, "\\+", "PLUS"),
        Rule::new(2, 2, "[ \t]+", "SKIP"),
    ];
    let out = run(&rules, &[(0, Token::Number), (1, Token::Plus)], "12 + 3");
    assert_eq!(
        out,
        vec![
            (Token::Number, "12".to_string()),
            (Token::Plus, "+".to_string()),
            (Token::Number, "3".to_string()),
            (Token::Eof, String::new()),
        ]
    );
}

#[test]
fn maximal_munch_beats_declaration_priority() {
    let rules = vec![
        Rule::new(0, 0, "if", "IF"),
        Rule::new(1, 1, "[A-Za-z]+", "ID"),
    ];
    let out = run(&rules, &[(0, Token::If), (1, Token::Id)], "iffy if");
    assert_eq!(
        out,
        vec![
            (Token::Id, "iffy".to_string()),
            (Token::If, "if".to_string()),
            (Token::Eof, String::new()),
        ]
    );
}

#[test]
fn greedy_operator_tokenization() {
    let rules = vec![Rule::new(0, 0, "==", "EQ"), Rule::new(1, 1, "=", "ASSIGN")];
    let out = run(&rules, &[(0, Token::Eq), (1, Token::Assign)], "===");
    assert_eq!(
        out,
        vec![
            (Token::Eq, "==".to_string()),
            (Token::Assign, "=".to_string()),
            (Token::Eof, String::new()),
        ]
    );
}

#[test]
fn empty_input_produces_a_single_eof_token() {
    let rules = vec![Rule::new(0, 0, "a", "A")];
    let out = run(&rules, &[(0, Token::Id)], "");
    assert_eq!(out, vec![(Token::Eof, String::new())]);
}

#[test]
fn token_starts_are_strictly_non_decreasing() {
    let rules = vec![
        Rule::new(0, 0, "[0-9]+", "NUMBER"),
        Rule::new(1, 1, "[ \t]+", "SKIP"),
    ];
    let dfa = compile(&rules, CompileOptions::default()).unwrap();
    let orders: HashMap<RuleId, u32> = rules.iter().map(|r| (r.id, r.order)).collect();
    let actions = Actions([(0, Token::Number)].into_iter().collect());
    let runtime = ScannerRuntime::new(&dfa, orders, &actions);
    let (tokens, _) = runtime.tokenize::<Token>("1 22 333");
    let starts: Vec<usize> = tokens.iter().map(|t| t.start).collect();
    assert!(starts.windows(2).all(|w| w[0] < w[1]));
}
