//! Phase E: Hopcroft partition-refinement minimization.

use std::collections::{HashMap, HashSet};

use crate::dfa::{Dfa, StateId};

type Block = Vec<StateId>;

/// The set of rule ids a multi-pattern accepting state could resolve to.
/// Two accepting states must never be merged unless they carry the same
/// signature: otherwise minimization could fuse "rule 0 just matched" with
/// "rule 1 just matched" into one state and silently change which action
/// fires, even though both states happen to behave identically from then
/// on. Single-pattern DFAs (empty `end_marker_rule`) all get the empty
/// signature, so they behave exactly like plain Hopcroft.
fn rule_signature(dfa: &Dfa, state: StateId) -> Vec<u32> {
    let Some(set) = dfa.position_set_of(state) else {
        return Vec::new();
    };
    let mut ids: Vec<u32> = set
        .iter()
        .filter_map(|p| dfa.end_marker_rule.get(p))
        .map(|r| r.0)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Minimize `dfa`, returning a new, independent, equivalent DFA with no two
/// indistinguishable states.
pub fn minimize(dfa: &Dfa) -> Dfa {
    tracing::trace!(
        phase = crate::diagnostics::PHASE_E_MINIMIZER,
        state_count = dfa.state_count(),
        "minimizing DFA"
    );
    let all_states: Vec<StateId> = dfa.states.values().copied().collect();
    let accepting: HashSet<StateId> = dfa.accepting.clone();
    let non_accepting: Vec<StateId> = all_states.iter().copied().filter(|s| !accepting.contains(s)).collect();
    let accepting_vec: Vec<StateId> = all_states.iter().copied().filter(|s| accepting.contains(s)).collect();

    let mut partition: Vec<Block> = Vec::new();
    // Accepting states start pre-split by rule signature (see
    // `rule_signature`), not lumped into one block, so a multi-pattern
    // scanner never loses track of which rule an accepting state belongs to.
    let mut accepting_groups: HashMap<Vec<u32>, Block> = HashMap::new();
    for &s in &accepting_vec {
        accepting_groups.entry(rule_signature(dfa, s)).or_default().push(s);
    }
    for (_, block) in accepting_groups {
        partition.push(block);
    }
    if !non_accepting.is_empty() {
        partition.push(non_accepting.clone());
    }

    let mut worklist: Vec<Block> = partition.clone();

    // Reverse transitions: for symbol c, target state -> sources reaching it on c.
    let mut reverse: HashMap<char, HashMap<StateId, Vec<StateId>>> = HashMap::new();
    for &c in &dfa.alphabet {
        let mut by_target: HashMap<StateId, Vec<StateId>> = HashMap::new();
        for &s in &all_states {
            if let Some(t) = dfa.transition(s, c) {
                by_target.entry(t).or_default().push(s);
            }
        }
        reverse.insert(c, by_target);
    }

    while let Some(r) = worklist.pop() {
        let r_set: HashSet<StateId> = r.iter().copied().collect();
        for &c in &dfa.alphabet {
            let by_target = reverse.get(&c).cloned().unwrap_or_default();
            let mut x: HashSet<StateId> = HashSet::new();
            for target in &r_set {
                if let Some(sources) = by_target.get(target) {
                    x.extend(sources.iter().copied());
                }
            }
            if x.is_empty() {
                continue;
            }

            let mut next_partition = Vec::with_capacity(partition.len());
            for y in partition.drain(..) {
                let (in_x, out_x): (Vec<StateId>, Vec<StateId>) = y.iter().partition(|s| x.contains(s));
                if !in_x.is_empty() && !out_x.is_empty() {
                    if let Some(pos) = worklist.iter().position(|b| same_block(b, &y)) {
                        worklist.remove(pos);
                        worklist.push(in_x.clone());
                        worklist.push(out_x.clone());
                    } else if in_x.len() <= out_x.len() {
                        worklist.push(in_x.clone());
                    } else {
                        worklist.push(out_x.clone());
                    }
                    next_partition.push(in_x);
                    next_partition.push(out_x);
                } else {
                    next_partition.push(y);
                }
            }
            partition = next_partition;
        }
    }

    let result = rebuild(dfa, &partition);
    tracing::trace!(state_count = result.state_count(), "minimization complete");
    result
}

fn same_block(a: &[StateId], b: &[StateId]) -> bool {
    let sa: HashSet<StateId> = a.iter().copied().collect();
    let sb: HashSet<StateId> = b.iter().copied().collect();
    sa == sb
}

fn rebuild(dfa: &Dfa, partition: &[Block]) -> Dfa {
    let mut state_to_block: HashMap<StateId, usize> = HashMap::new();
    for (idx, block) in partition.iter().enumerate() {
        for &s in block {
            state_to_block.insert(s, idx);
        }
    }

    let representative: Vec<StateId> = partition
        .iter()
        .map(|block| *block.iter().min().unwrap())
        .collect();

    let mut states: HashMap<crate::syntax_tree::PositionSet, StateId> = HashMap::new();
    for (idx, &rep) in representative.iter().enumerate() {
        if let Some(set) = dfa.position_set_of(rep) {
            states.insert(set.clone(), StateId(idx as u32));
        }
    }

    let mut transitions: HashMap<StateId, std::collections::BTreeMap<char, StateId>> = HashMap::new();
    for (idx, &rep) in representative.iter().enumerate() {
        let mut row = std::collections::BTreeMap::new();
        for &c in &dfa.alphabet {
            if let Some(target) = dfa.transition(rep, c) {
                let target_block = state_to_block[&target];
                row.insert(c, StateId(target_block as u32));
            }
        }
        transitions.insert(StateId(idx as u32), row);
    }

    let initial = StateId(state_to_block[&dfa.initial] as u32);
    let accepting: HashSet<StateId> = (0..partition.len())
        .filter(|idx| partition[*idx].iter().any(|s| dfa.accepting.contains(s)))
        .map(|idx| StateId(idx as u32))
        .collect();

    let mut end_marker_rule = HashMap::new();
    for (pos, rule) in &dfa.end_marker_rule {
        end_marker_rule.insert(*pos, *rule);
    }

    Dfa {
        alphabet: dfa.alphabet.clone(),
        states,
        transitions,
        initial,
        accepting,
        pos_to_symbol: dfa.pos_to_symbol.clone(),
        end_marker_rule,
    }
}
