//! Phase B: Dijkstra's shunting-yard algorithm, converting the infix token
//! stream produced by [`crate::regex_lexer`] into postfix (RPN) order.

use crate::error::StructuralError;
use crate::regex_token::{OperatorKind, RegexToken};

fn precedence(op: OperatorKind) -> u8 {
    match op {
        OperatorKind::Star | OperatorKind::Plus | OperatorKind::Question => 3,
        OperatorKind::Concat => 2,
        OperatorKind::Alt => 1,
        OperatorKind::LParen | OperatorKind::RParen => 0,
    }
}

fn is_unary(op: OperatorKind) -> bool {
    matches!(op, OperatorKind::Star | OperatorKind::Plus | OperatorKind::Question)
}

pub fn to_postfix(tokens: &[RegexToken]) -> Result<Vec<RegexToken>, StructuralError> {
    tracing::trace!(
        phase = crate::diagnostics::PHASE_B_SHUNTING_YARD,
        input_len = tokens.len(),
        "converting to postfix"
    );
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<OperatorKind> = Vec::new();

    for &token in tokens {
        match token {
            RegexToken::Literal(_) => output.push(token),
            RegexToken::Operator(op) if is_unary(op) => {
                // Unary postfix operators bind only to the preceding
                // operand already on the output queue.
                output.push(token);
            }
            RegexToken::Operator(OperatorKind::LParen) => stack.push(OperatorKind::LParen),
            RegexToken::Operator(OperatorKind::RParen) => {
                loop {
                    match stack.pop() {
                        Some(OperatorKind::LParen) => break,
                        Some(op) => output.push(RegexToken::Operator(op)),
                        None => return Err(StructuralError::UnbalancedParens),
                    }
                }
            }
            RegexToken::Operator(op) => {
                while let Some(&top) = stack.last() {
                    if top != OperatorKind::LParen && precedence(top) >= precedence(op) {
                        output.push(RegexToken::Operator(stack.pop().unwrap()));
                    } else {
                        break;
                    }
                }
                stack.push(op);
            }
        }
    }

    while let Some(op) = stack.pop() {
        if op == OperatorKind::LParen {
            return Err(StructuralError::UnbalancedParens);
        }
        output.push(RegexToken::Operator(op));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex_lexer::tokenize;

    #[test]
    fn concat_binds_tighter_than_alt() {
        let infix = tokenize("ab|c").unwrap();
        let postfix = to_postfix(&infix).unwrap();
        assert_eq!(
            postfix,
            vec![
                RegexToken::Literal('a'),
                RegexToken::Literal('b'),
                RegexToken::Operator(OperatorKind::Concat),
                RegexToken::Literal('c'),
                RegexToken::Operator(OperatorKind::Alt),
            ]
        );
    }

    #[test]
    fn star_binds_to_preceding_operand_only() {
        let infix = tokenize("ab*").unwrap();
        let postfix = to_postfix(&infix).unwrap();
        assert_eq!(
            postfix,
            vec![
                RegexToken::Literal('a'),
                RegexToken::Literal('b'),
                RegexToken::Operator(OperatorKind::Star),
                RegexToken::Operator(OperatorKind::Concat),
            ]
        );
    }

    #[test]
    fn unmatched_close_paren_errors() {
        let infix = tokenize("a)").unwrap();
        assert_eq!(to_postfix(&infix), Err(StructuralError::UnbalancedParens));
    }

    #[test]
    fn unmatched_open_paren_errors() {
        let infix = tokenize("(a").unwrap();
        assert_eq!(to_postfix(&infix), Err(StructuralError::UnbalancedParens));
    }
}
