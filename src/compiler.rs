//! Phase F: combine an ordered list of rules into a single tagged DFA,
//! preserving declaration-order priority (the canonical "combined DFA"
//! strategy).

use std::collections::HashMap;

use crate::dfa::{self, Dfa};
use crate::error::{CompileError, CompositionError};
use crate::minimize;
use crate::regex_lexer;
use crate::regex_token::{OperatorKind, RegexToken};
use crate::rule::{Rule, RuleId};
use crate::shunting_yard;
use crate::syntax_tree;

/// Reserved private-use-area base for per-rule end markers; rule `i` is
/// assigned `END_MARKER_BASE + i`.
pub const END_MARKER_BASE: u32 = 0xE000;

#[derive(Debug, Clone, Copy)]
pub enum MultiPatternStrategy {
    Combined,
}

#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub minimize: bool,
    pub strategy: MultiPatternStrategy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            minimize: true,
            strategy: MultiPatternStrategy::Combined,
        }
    }
}

/// Compile `rules` into a single DFA whose accepting states carry
/// `end_marker_rule` entries identifying which rule matched.
///
/// Each rule's end marker is parsed as an ordinary literal character drawn
/// from the reserved private-use-area range, so the whole combined pattern
/// `(r_0 . m_0) | (r_1 . m_1) | ...` can go through one ordinary
/// `tokenize -> postfix -> build` pass with continuous position numbering;
/// markers are retagged afterwards so the DFA alphabet excludes them.
pub fn compile(rules: &[Rule], options: CompileOptions) -> Result<Dfa, CompileError> {
    if rules.is_empty() {
        return Err(CompositionError::EmptyRuleSet.into());
    }

    tracing::debug!(
        phase = crate::diagnostics::PHASE_F_COMPILER,
        rule_count = rules.len(),
        "compiling multi-pattern scanner"
    );

    let mut markers: HashMap<char, RuleId> = HashMap::new();
    let mut combined_postfix: Vec<RegexToken> = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        let marker = char::from_u32(END_MARKER_BASE + index as u32)
            .expect("private-use-area offsets stay within valid code points");

        let infix = regex_lexer::tokenize(&rule.pattern_regex)?;
        for token in &infix {
            if let RegexToken::Literal(c) = token {
                if *c == marker || (*c as u32) >= END_MARKER_BASE {
                    return Err(CompositionError::MarkerCollision(*c).into());
                }
            }
        }

        let mut postfix = shunting_yard::to_postfix(&infix)?;
        postfix.push(RegexToken::Literal(marker));
        postfix.push(RegexToken::Operator(OperatorKind::Concat));

        if combined_postfix.is_empty() {
            combined_postfix = postfix;
        } else {
            combined_postfix.extend(postfix);
            combined_postfix.push(RegexToken::Operator(OperatorKind::Alt));
        }

        markers.insert(marker, rule.id);
    }

    let mut tree = syntax_tree::build(&combined_postfix)?;
    let end_marker_rule = syntax_tree::retag_end_markers(&mut tree, &markers);

    let followpos = syntax_tree::compute_followpos(&tree);
    let mut compiled = dfa::build(&tree, &followpos);
    compiled.end_marker_rule = end_marker_rule;

    let compiled = match options.strategy {
        MultiPatternStrategy::Combined => compiled,
    };

    let compiled = if options.minimize {
        minimize::minimize(&compiled)
    } else {
        compiled
    };

    tracing::debug!(state_count = compiled.state_count(), "scanner compiled");
    Ok(compiled)
}

/// Resolve which rule owns an accepting DFA state, per the priority
/// tiebreak: among the end-marker positions present in the state, the one
/// whose rule has the smallest `order` wins.
pub fn resolve_rule(dfa: &Dfa, state: crate::dfa::StateId, orders: &HashMap<RuleId, u32>) -> Option<RuleId> {
    let set = dfa.position_set_of(state)?;
    set.iter()
        .filter_map(|p| dfa.end_marker_rule.get(p))
        .copied()
        .min_by_key(|rule| orders.get(rule).copied().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    fn orders(rules: &[Rule]) -> HashMap<RuleId, u32> {
        rules.iter().map(|r| (r.id, r.order)).collect()
    }

    fn scan_all(dfa: &Dfa, orders: &HashMap<RuleId, u32>, input: &str) -> Vec<(RuleId, String)> {
        let chars: Vec<char> = input.chars().collect();
        let mut out = Vec::new();
        let mut pos = 0usize;
        while pos < chars.len() {
            let mut cur = dfa.initial;
            let mut last_accept: Option<(usize, RuleId)> = None;
            let mut i = pos;
            loop {
                if i < chars.len() {
                    if let Some(next) = dfa.transition(cur, chars[i]) {
                        cur = next;
                        i += 1;
                        if dfa.is_accepting(cur) {
                            if let Some(rule) = resolve_rule(dfa, cur, orders) {
                                last_accept = Some((i, rule));
                            }
                        }
                        continue;
                    }
                }
                break;
            }
            let (end, rule) = last_accept.expect("input should be fully covered by test fixtures");
            out.push((rule, chars[pos..end].iter().collect()));
            pos = end;
        }
        out
    }

    #[test]
    fn combined_dfa_tags_every_accepting_state() {
        let rules = vec![
            Rule::new(0, 0, "[0-9]+", "NUMBER"),
            Rule::new(1, 1, "\\+", "PLUS"),
        ];
        let dfa = compile(&rules, CompileOptions::default()).unwrap();
        for state in &dfa.accepting {
            let set = dfa.position_set_of(*state).unwrap();
            assert!(set.iter().any(|p| dfa.end_marker_rule.contains_key(p)));
        }
    }

    #[test]
    fn marker_collision_is_detected() {
        let marker = char::from_u32(END_MARKER_BASE).unwrap();
        let pattern: String = marker.to_string();
        let rules = vec![Rule::new(0, 0, format!("\\{pattern}"), "X")];
        let err = compile(&rules, CompileOptions::default());
        assert!(matches!(
            err,
            Err(CompileError::Composition(CompositionError::MarkerCollision(_)))
        ));
    }

    #[test]
    fn priority_tiebreak_prefers_lower_order() {
        let rules = vec![
            Rule::new(0, 0, "if", "IF"),
            Rule::new(1, 1, "[A-Za-z]+", "ID"),
        ];
        let dfa = compile(&rules, CompileOptions::default()).unwrap();
        let tokens = scan_all(&dfa, &orders(&rules), "if");
        assert_eq!(tokens[0].0, RuleId(0));
    }

    #[test]
    fn maximal_munch_beats_priority() {
        let rules = vec![
            Rule::new(0, 0, "if", "IF"),
            Rule::new(1, 1, "[A-Za-z]+", "ID"),
        ];
        let dfa = compile(&rules, CompileOptions::default()).unwrap();
        let tokens = scan_all(&dfa, &orders(&rules), "iffy");
        assert_eq!(tokens, vec![(RuleId(1), "iffy".to_string())]);
    }
}
