//! Phase C: build a marked syntax tree from postfix regex tokens, computing
//! `nullable`/`firstpos`/`lastpos` per node and the followpos table used by
//! direct DFA construction.

use std::collections::BTreeSet;

use crate::error::StructuralError;
use crate::regex_token::{OperatorKind, RegexToken};

pub type Position = u32;
/// A canonical, sorted, deduplicated set of leaf positions.
pub type PositionSet = BTreeSet<Position>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Char(char),
    EndMarker(char),
    Epsilon,
}

#[derive(Debug, Clone)]
pub enum SyntaxNode {
    Leaf { symbol: Symbol, position: Position },
    Binary { op: BinaryOp, left: NodeId, right: NodeId },
    Unary { child: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Concat,
    Alt,
}

#[derive(Debug, Clone, Default)]
struct Attrs {
    nullable: bool,
    firstpos: PositionSet,
    lastpos: PositionSet,
}

/// An arena-allocated syntax tree. `NodeId` indexes into parallel `nodes`
/// and `attrs` vectors; there is no pointer graph to walk.
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    attrs: Vec<Attrs>,
    pub pos_to_symbol: std::collections::HashMap<Position, Symbol>,
    pub root: NodeId,
    next_position: Position,
}

impl SyntaxTree {
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub fn nullable(&self, id: NodeId) -> bool {
        self.attrs[id.0].nullable
    }

    pub fn firstpos(&self, id: NodeId) -> &PositionSet {
        &self.attrs[id.0].firstpos
    }

    pub fn lastpos(&self, id: NodeId) -> &PositionSet {
        &self.attrs[id.0].lastpos
    }

    pub fn position_count(&self) -> u32 {
        self.next_position - 1
    }
}

struct Builder {
    nodes: Vec<SyntaxNode>,
    attrs: Vec<Attrs>,
    pos_to_symbol: std::collections::HashMap<Position, Symbol>,
    next_position: Position,
}

impl Builder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            attrs: Vec::new(),
            pos_to_symbol: std::collections::HashMap::new(),
            next_position: 1,
        }
    }

    fn alloc_leaf(&mut self, symbol: Symbol) -> NodeId {
        let position = self.next_position;
        self.next_position += 1;
        self.pos_to_symbol.insert(position, symbol);
        let nullable = matches!(symbol, Symbol::Epsilon);
        let mut set = PositionSet::new();
        set.insert(position);
        self.push(SyntaxNode::Leaf { symbol, position }, Attrs {
            nullable,
            firstpos: set.clone(),
            lastpos: set,
        })
    }

    fn push(&mut self, node: SyntaxNode, attrs: Attrs) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.attrs.push(attrs);
        id
    }

    fn alloc_binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        let (l, r) = (&self.attrs[left.0], &self.attrs[right.0]);
        let attrs = match op {
            BinaryOp::Concat => Attrs {
                nullable: l.nullable && r.nullable,
                firstpos: if l.nullable {
                    l.firstpos.union(&r.firstpos).copied().collect()
                } else {
                    l.firstpos.clone()
                },
                lastpos: if r.nullable {
                    r.lastpos.union(&l.lastpos).copied().collect()
                } else {
                    r.lastpos.clone()
                },
            },
            BinaryOp::Alt => Attrs {
                nullable: l.nullable || r.nullable,
                firstpos: l.firstpos.union(&r.firstpos).copied().collect(),
                lastpos: l.lastpos.union(&r.lastpos).copied().collect(),
            },
        };
        self.push(SyntaxNode::Binary { op, left, right }, attrs)
    }

    fn alloc_star(&mut self, child: NodeId) -> NodeId {
        let c = self.attrs[child.0].clone();
        let attrs = Attrs {
            nullable: true,
            firstpos: c.firstpos,
            lastpos: c.lastpos,
        };
        self.push(SyntaxNode::Unary { child }, attrs)
    }

    /// Deep-copy the subtree rooted at `id`, allocating brand-new leaf
    /// positions so the copy shares no position with the original. Used by
    /// `+` desugaring, where aliasing positions would conflate followpos.
    fn deep_copy(&mut self, id: NodeId) -> NodeId {
        match self.nodes[id.0].clone() {
            SyntaxNode::Leaf { symbol, .. } => self.alloc_leaf(symbol),
            SyntaxNode::Binary { op, left, right } => {
                let l = self.deep_copy(left);
                let r = self.deep_copy(right);
                self.alloc_binary(op, l, r)
            }
            SyntaxNode::Unary { child } => {
                let c = self.deep_copy(child);
                self.alloc_star(c)
            }
        }
    }
}

/// Build the syntax tree from postfix tokens. The returned tree does not
/// yet carry an end marker; callers append one with [`append_end_marker`].
pub fn build(postfix: &[RegexToken]) -> Result<SyntaxTree, StructuralError> {
    tracing::trace!(phase = crate::diagnostics::PHASE_C_SYNTAX_TREE, token_count = postfix.len(), "building syntax tree");
    let mut b = Builder::new();
    let mut stack: Vec<NodeId> = Vec::new();

    for &token in postfix {
        match token {
            RegexToken::Literal(c) => {
                let id = b.alloc_leaf(Symbol::Char(c));
                stack.push(id);
            }
            RegexToken::Operator(OperatorKind::Concat) => {
                let right = stack.pop().ok_or(StructuralError::MalformedPostfix)?;
                let left = stack.pop().ok_or(StructuralError::MalformedPostfix)?;
                stack.push(b.alloc_binary(BinaryOp::Concat, left, right));
            }
            RegexToken::Operator(OperatorKind::Alt) => {
                let right = stack.pop().ok_or(StructuralError::MalformedPostfix)?;
                let left = stack.pop().ok_or(StructuralError::MalformedPostfix)?;
                stack.push(b.alloc_binary(BinaryOp::Alt, left, right));
            }
            RegexToken::Operator(OperatorKind::Star) => {
                let child = stack.pop().ok_or(StructuralError::MalformedPostfix)?;
                stack.push(b.alloc_star(child));
            }
            RegexToken::Operator(OperatorKind::Plus) => {
                // A+ -> A . A*, with the starred copy using fresh positions.
                let a = stack.pop().ok_or(StructuralError::MalformedPostfix)?;
                let a_prime = b.deep_copy(a);
                let starred = b.alloc_star(a_prime);
                stack.push(b.alloc_binary(BinaryOp::Concat, a, starred));
            }
            RegexToken::Operator(OperatorKind::Question) => {
                // A? -> A | ε, with a fresh epsilon leaf.
                let a = stack.pop().ok_or(StructuralError::MalformedPostfix)?;
                let eps = b.alloc_leaf(Symbol::Epsilon);
                stack.push(b.alloc_binary(BinaryOp::Alt, a, eps));
            }
            RegexToken::Operator(OperatorKind::LParen)
            | RegexToken::Operator(OperatorKind::RParen) => {
                return Err(StructuralError::MalformedPostfix);
            }
        }
    }

    if stack.len() != 1 {
        return Err(StructuralError::MalformedPostfix);
    }
    let root = stack.pop().unwrap();

    Ok(SyntaxTree {
        nodes: b.nodes,
        attrs: b.attrs,
        pos_to_symbol: b.pos_to_symbol,
        root,
        next_position: b.next_position,
    })
}

/// Retag every leaf whose literal symbol matches a key in `markers` as an
/// end marker belonging to the mapped rule, and exclude it from the future
/// DFA alphabet. Used when several rules are combined into one tree via
/// [`crate::compiler`], where each rule's reserved marker character is
/// parsed as an ordinary literal and only later promoted.
pub fn retag_end_markers(
    tree: &mut SyntaxTree,
    markers: &std::collections::HashMap<char, crate::rule::RuleId>,
) -> std::collections::HashMap<Position, crate::rule::RuleId> {
    let mut end_marker_rule = std::collections::HashMap::new();
    for (pos, symbol) in tree.pos_to_symbol.iter_mut() {
        if let Symbol::Char(c) = symbol {
            if let Some(rule) = markers.get(c) {
                end_marker_rule.insert(*pos, *rule);
                *symbol = Symbol::EndMarker(*c);
            }
        }
    }
    end_marker_rule
}

/// Concatenate a reserved end-marker leaf after the existing root, turning
/// pattern `R` into `R . marker`. Returns the new root.
pub fn append_end_marker(tree: SyntaxTree, marker: char) -> SyntaxTree {
    let SyntaxTree {
        nodes,
        attrs,
        pos_to_symbol,
        root,
        next_position,
    } = tree;
    let mut b = Builder {
        nodes,
        attrs,
        pos_to_symbol,
        next_position,
    };
    let marker_leaf = b.alloc_leaf(Symbol::EndMarker(marker));
    let new_root = b.alloc_binary(BinaryOp::Concat, root, marker_leaf);
    SyntaxTree {
        nodes: b.nodes,
        attrs: b.attrs,
        pos_to_symbol: b.pos_to_symbol,
        root: new_root,
        next_position: b.next_position,
    }
}

/// Compute followpos for every position in the tree via post-order
/// traversal over `Concat` and `Star` nodes.
pub fn compute_followpos(tree: &SyntaxTree) -> std::collections::HashMap<Position, PositionSet> {
    let mut table: std::collections::HashMap<Position, PositionSet> = std::collections::HashMap::new();
    for p in 1..=tree.position_count() {
        table.entry(p).or_default();
    }

    fn visit(
        tree: &SyntaxTree,
        id: NodeId,
        table: &mut std::collections::HashMap<Position, PositionSet>,
    ) {
        match tree.node(id).clone() {
            SyntaxNode::Leaf { .. } => {}
            SyntaxNode::Binary { op, left, right } => {
                visit(tree, left, table);
                visit(tree, right, table);
                if op == BinaryOp::Concat {
                    let first_r = tree.firstpos(right).clone();
                    for p in tree.lastpos(left) {
                        table.entry(*p).or_default().extend(first_r.iter().copied());
                    }
                }
            }
            SyntaxNode::Unary { child } => {
                visit(tree, child, table);
                let first_c = tree.firstpos(child).clone();
                for p in tree.lastpos(child) {
                    table.entry(*p).or_default().extend(first_c.iter().copied());
                }
            }
        }
    }

    visit(tree, tree.root, &mut table);
    table
}
