//! Phase A: translate surface regex syntax into a flat [`RegexToken`]
//! stream with explicit concatenation operators inserted between adjacent
//! atoms, ready for [`crate::shunting_yard`].

use crate::error::RegexLexError;
use crate::regex_token::{OperatorKind, RegexToken};

const RESERVED: &str = "|.*+?()[]\\'\"#";

/// Tokenize one already-definition-expanded regex source string.
pub fn tokenize(source: &str) -> Result<Vec<RegexToken>, RegexLexError> {
    tracing::trace!(phase = crate::diagnostics::PHASE_A_REGEX_LEXER, source, "tokenizing regex source");
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut pending_concat = false;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => {
                i += 1;
            }
            '(' => {
                maybe_concat(&mut tokens, &mut pending_concat);
                tokens.push(RegexToken::Operator(OperatorKind::LParen));
                pending_concat = false;
                i += 1;
            }
            ')' => {
                tokens.push(RegexToken::Operator(OperatorKind::RParen));
                pending_concat = true;
                i += 1;
            }
            '|' => {
                tokens.push(RegexToken::Operator(OperatorKind::Alt));
                pending_concat = false;
                i += 1;
            }
            '*' => {
                tokens.push(RegexToken::Operator(OperatorKind::Star));
                pending_concat = true;
                i += 1;
            }
            '+' => {
                tokens.push(RegexToken::Operator(OperatorKind::Plus));
                pending_concat = true;
                i += 1;
            }
            '?' => {
                tokens.push(RegexToken::Operator(OperatorKind::Question));
                pending_concat = true;
                i += 1;
            }
            '\\' => {
                let (literal, consumed) = read_escape(&chars, i)?;
                push_literal(&mut tokens, &mut pending_concat, literal);
                i += consumed;
            }
            '\'' | '"' => {
                let (decoded, consumed) = read_quoted(&chars, i)?;
                push_literal_run(&mut tokens, &mut pending_concat, &decoded);
                i += consumed;
            }
            '[' => {
                let (class_chars, consumed) = read_class(&chars, i)?;
                maybe_concat(&mut tokens, &mut pending_concat);
                push_class(&mut tokens, &class_chars);
                pending_concat = true;
                i += consumed;
            }
            ']' => return Err(RegexLexError::UnknownChar(c, i)),
            c if RESERVED.contains(c) => return Err(RegexLexError::UnknownChar(c, i)),
            c => {
                push_literal(&mut tokens, &mut pending_concat, c);
                i += 1;
            }
        }
    }

    tracing::trace!(token_count = tokens.len(), "regex tokenized");
    Ok(tokens)
}

fn maybe_concat(tokens: &mut Vec<RegexToken>, pending_concat: &mut bool) {
    if *pending_concat {
        tokens.push(RegexToken::Operator(OperatorKind::Concat));
    }
}

fn push_literal(tokens: &mut Vec<RegexToken>, pending_concat: &mut bool, c: char) {
    maybe_concat(tokens, pending_concat);
    tokens.push(RegexToken::Literal(c));
    *pending_concat = true;
}

fn push_literal_run(tokens: &mut Vec<RegexToken>, pending_concat: &mut bool, run: &[char]) {
    for c in run {
        push_literal(tokens, pending_concat, *c);
    }
}

fn push_class(tokens: &mut Vec<RegexToken>, class_chars: &[char]) {
    tokens.push(RegexToken::Operator(OperatorKind::LParen));
    for (idx, c) in class_chars.iter().enumerate() {
        if idx > 0 {
            tokens.push(RegexToken::Operator(OperatorKind::Alt));
        }
        tokens.push(RegexToken::Literal(*c));
    }
    tokens.push(RegexToken::Operator(OperatorKind::RParen));
}

/// Read `\x` starting at `start` (which points at the backslash). Returns
/// the literal character and the number of source characters consumed.
fn read_escape(chars: &[char], start: usize) -> Result<(char, usize), RegexLexError> {
    match chars.get(start + 1) {
        Some(&c) => Ok((c, 2)),
        None => Err(RegexLexError::TrailingEscape(start)),
    }
}

/// Read a quoted literal `'...'`/`"..."` starting at `start` (pointing at
/// the opening quote). Escape sequences inside are decoded: `\n`, `\t`,
/// `\uXXXX`, and any other `\x` yields the literal `x`.
fn read_quoted(chars: &[char], start: usize) -> Result<(Vec<char>, usize), RegexLexError> {
    let quote = chars[start];
    let mut i = start + 1;
    let mut decoded = Vec::new();
    loop {
        match chars.get(i) {
            None => return Err(RegexLexError::UnterminatedLiteral(start)),
            Some(&c) if c == quote => {
                i += 1;
                break;
            }
            Some('\\') => {
                let (c, consumed) = decode_quoted_escape(chars, i)?;
                decoded.push(c);
                i += consumed;
            }
            Some(&c) => {
                decoded.push(c);
                i += 1;
            }
        }
    }
    Ok((decoded, i - start))
}

fn decode_quoted_escape(chars: &[char], backslash_pos: usize) -> Result<(char, usize), RegexLexError> {
    match chars.get(backslash_pos + 1) {
        None => Err(RegexLexError::TrailingEscape(backslash_pos)),
        Some('n') => Ok(('\n', 2)),
        Some('t') => Ok(('\t', 2)),
        Some('r') => Ok(('\r', 2)),
        Some('u') => {
            let digits: String = chars
                .get(backslash_pos + 2..backslash_pos + 6)
                .map(|s| s.iter().collect())
                .unwrap_or_default();
            if digits.len() == 4 {
                if let Ok(code) = u32::from_str_radix(&digits, 16) {
                    if let Some(c) = char::from_u32(code) {
                        return Ok((c, 6));
                    }
                }
            }
            Err(RegexLexError::UnterminatedLiteral(backslash_pos))
        }
        Some(&c) => Ok((c, 2)),
    }
}

/// Read a character class `[...]` starting at `start` (pointing at `[`).
/// Returns the distinct code points it denotes, in input order, and the
/// number of source characters consumed.
fn read_class(chars: &[char], start: usize) -> Result<(Vec<char>, usize), RegexLexError> {
    let mut i = start + 1;
    let mut raw = Vec::new();
    loop {
        match chars.get(i) {
            None => return Err(RegexLexError::UnterminatedClass(start)),
            Some(']') => {
                i += 1;
                break;
            }
            Some('\\') => {
                let (c, consumed) = read_escape(chars, i)?;
                raw.push(c);
                i += consumed;
            }
            Some(&c) if c.is_whitespace() || c == '\'' || c == '"' => {
                i += 1;
            }
            Some(&c) => {
                raw.push(c);
                i += 1;
            }
        }
    }

    let mut expanded = Vec::new();
    let mut j = 0usize;
    while j < raw.len() {
        if j + 2 < raw.len() && raw[j + 1] == '-' {
            let (mut lo, mut hi) = (raw[j] as u32, raw[j + 2] as u32);
            if lo > hi {
                std::mem::swap(&mut lo, &mut hi);
            }
            for code in lo..=hi {
                if let Some(c) = char::from_u32(code) {
                    expanded.push(c);
                }
            }
            j += 3;
        } else {
            expanded.push(raw[j]);
            j += 1;
        }
    }

    let mut seen = std::collections::HashSet::new();
    let deduped: Vec<char> = expanded.into_iter().filter(|c| seen.insert(*c)).collect();
    Ok((deduped, i - start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_implicit_concat_between_literals() {
        let tokens = tokenize("ab").unwrap();
        assert_eq!(
            tokens,
            vec![
                RegexToken::Literal('a'),
                RegexToken::Operator(OperatorKind::Concat),
                RegexToken::Literal('b'),
            ]
        );
    }

    #[test]
    fn no_concat_after_alt_or_open_paren() {
        let tokens = tokenize("(a|b)").unwrap();
        assert_eq!(
            tokens,
            vec![
                RegexToken::Operator(OperatorKind::LParen),
                RegexToken::Literal('a'),
                RegexToken::Operator(OperatorKind::Alt),
                RegexToken::Literal('b'),
                RegexToken::Operator(OperatorKind::RParen),
            ]
        );
    }

    #[test]
    fn expands_character_class_range() {
        let tokens = tokenize("[a-c]").unwrap();
        assert_eq!(
            tokens,
            vec![
                RegexToken::Operator(OperatorKind::LParen),
                RegexToken::Literal('a'),
                RegexToken::Operator(OperatorKind::Alt),
                RegexToken::Literal('b'),
                RegexToken::Operator(OperatorKind::Alt),
                RegexToken::Literal('c'),
                RegexToken::Operator(OperatorKind::RParen),
            ]
        );
    }

    #[test]
    fn reorders_backwards_range() {
        // Same three literals regardless of declared direction.
        let lits: Vec<char> = tokenize("[c-a]")
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                RegexToken::Literal(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(lits, vec!['a', 'b', 'c']);
    }

    #[test]
    fn bare_hash_is_reserved() {
        assert_eq!(tokenize("#"), Err(RegexLexError::UnknownChar('#', 0)));
    }

    #[test]
    fn escaped_hash_is_literal() {
        let tokens = tokenize("\\#").unwrap();
        assert_eq!(tokens, vec![RegexToken::Literal('#')]);
    }

    #[test]
    fn trailing_escape_errors() {
        assert_eq!(tokenize("a\\"), Err(RegexLexError::TrailingEscape(1)));
    }

    #[test]
    fn unterminated_class_errors() {
        assert_eq!(tokenize("[a-c"), Err(RegexLexError::UnterminatedClass(0)));
    }

    #[test]
    fn quoted_literal_decodes_escapes() {
        let tokens = tokenize("\"a\\nb\"").unwrap();
        assert_eq!(
            tokens,
            vec![
                RegexToken::Literal('a'),
                RegexToken::Operator(OperatorKind::Concat),
                RegexToken::Literal('\n'),
                RegexToken::Operator(OperatorKind::Concat),
                RegexToken::Literal('b'),
            ]
        );
    }
}
