//! Phase D: direct DFA construction from a syntax tree's followpos table
//! (Aho/Sethi/Ullman's algorithm), with no intermediate NFA.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::rule::RuleId;
use crate::syntax_tree::{Position, PositionSet, Symbol, SyntaxTree};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StateId(pub u32);

#[derive(Debug, Clone)]
pub struct Dfa {
    pub alphabet: Vec<char>,
    /// Canonicalizing map from a state's position set to its id.
    pub states: HashMap<PositionSet, StateId>,
    pub transitions: HashMap<StateId, BTreeMap<char, StateId>>,
    pub initial: StateId,
    pub accepting: std::collections::HashSet<StateId>,
    pub pos_to_symbol: HashMap<Position, Symbol>,
    /// Multi-pattern only: which rule owns a given end-marker position.
    pub end_marker_rule: HashMap<Position, RuleId>,
}

impl Dfa {
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.transitions.get(&state).and_then(|row| row.get(&symbol)).copied()
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    /// Position set represented by a state, looked up by reverse scan of
    /// the canonicalizing map (small automata only; used for priority
    /// resolution, not the scan hot path).
    pub fn position_set_of(&self, state: StateId) -> Option<&PositionSet> {
        self.states.iter().find(|(_, id)| **id == state).map(|(set, _)| set)
    }
}

/// Build a DFA directly from a syntax tree that already has an end marker
/// concatenated at its root (see [`crate::syntax_tree::append_end_marker`]).
pub fn build(tree: &SyntaxTree, followpos: &HashMap<Position, PositionSet>) -> Dfa {
    tracing::trace!(phase = crate::diagnostics::PHASE_D_DFA_BUILDER, "constructing DFA via followpos");
    let mut alphabet: Vec<char> = tree
        .pos_to_symbol
        .values()
        .filter_map(|s| match s {
            Symbol::Char(c) => Some(*c),
            _ => None,
        })
        .collect();
    alphabet.sort_unstable();
    alphabet.dedup();

    let mut states: HashMap<PositionSet, StateId> = HashMap::new();
    let mut transitions: HashMap<StateId, BTreeMap<char, StateId>> = HashMap::new();
    let mut worklist: VecDeque<PositionSet> = VecDeque::new();

    let initial_set = tree.firstpos(tree.root).clone();
    states.insert(initial_set.clone(), StateId(0));
    worklist.push_back(initial_set.clone());
    let initial = StateId(0);

    while let Some(set) = worklist.pop_front() {
        let tid = states[&set];
        let mut row = BTreeMap::new();
        for &symbol in &alphabet {
            let mut union: PositionSet = PositionSet::new();
            for p in &set {
                if tree.pos_to_symbol.get(p) == Some(&Symbol::Char(symbol)) {
                    if let Some(follow) = followpos.get(p) {
                        union.extend(follow.iter().copied());
                    }
                }
            }
            if union.is_empty() {
                continue;
            }
            let next_id = StateId(states.len() as u32);
            let id = match states.entry(union.clone()) {
                std::collections::hash_map::Entry::Occupied(e) => *e.get(),
                std::collections::hash_map::Entry::Vacant(e) => {
                    e.insert(next_id);
                    worklist.push_back(union.clone());
                    next_id
                }
            };
            row.insert(symbol, id);
        }
        transitions.insert(tid, row);
    }

    let mut accepting = std::collections::HashSet::new();
    let mut max_position = 0u32;
    for (set, id) in &states {
        if set.iter().any(|p| matches!(tree.pos_to_symbol.get(p), Some(Symbol::EndMarker(_)))) {
            accepting.insert(*id);
        }
        if let Some(max) = set.iter().max() {
            max_position = max_position.max(*max);
        }
    }
    if accepting.is_empty() && max_position > 0 {
        for (set, id) in &states {
            if set.contains(&max_position) {
                accepting.insert(*id);
            }
        }
    }

    tracing::trace!(state_count = states.len(), "DFA construction complete");
    Dfa {
        alphabet,
        states,
        transitions,
        initial,
        accepting,
        pos_to_symbol: tree.pos_to_symbol.clone(),
        end_marker_rule: HashMap::new(),
    }
}
