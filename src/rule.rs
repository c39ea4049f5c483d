//! Types describing the external contract between a specification-file
//! parser (out of scope for this crate) and the compilation pipeline.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuleId(pub u32);

/// One ordered pattern/action pair as it comes out of a `rule name = regex
/// { action } | ...` declaration. `order` is the declaration index; lower
/// wins ties between equal-length matches.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub order: u32,
    pub pattern_regex: String,
    pub action: String,
}

impl Rule {
    pub fn new(id: u32, order: u32, pattern_regex: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: RuleId(id),
            order,
            pattern_regex: pattern_regex.into(),
            action: action.into(),
        }
    }
}

/// Collaborator contract a specification-file parser must satisfy. This
/// crate never implements the parser itself; it only consumes the
/// structured value one would produce.
pub trait SpecProducer {
    fn header(&self) -> &str;
    fn trailer(&self) -> &str;
    fn definitions(&self) -> &[(String, String)];
    fn rules(&self) -> &[Rule];
    fn entry_point(&self) -> &str;
}

/// Expand named definitions referenced as `{name}` inside a regex source,
/// wrapping each substitution in parentheses and iterating to a fixpoint so
/// definitions may reference earlier definitions.
pub fn expand_definitions(regex_source: &str, definitions: &[(String, String)]) -> String {
    let table: HashMap<&str, &str> = definitions
        .iter()
        .map(|(name, pattern)| (name.as_str(), pattern.as_str()))
        .collect();

    let mut expanded = regex_source.to_string();
    loop {
        let mut changed = false;
        let mut next = String::with_capacity(expanded.len());
        let mut chars = expanded.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '{' {
                if let Some(end) = expanded[i..].find('}') {
                    let name = &expanded[i + 1..i + end];
                    if let Some(pattern) = table.get(name) {
                        next.push('(');
                        next.push_str(pattern);
                        next.push(')');
                        changed = true;
                        // Skip past the consumed `{name}` span.
                        for _ in 0..end {
                            chars.next();
                        }
                        continue;
                    }
                }
            }
            next.push(c);
        }
        expanded = next;
        if !changed {
            break;
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_single_definition() {
        let defs = vec![("digit".to_string(), "[0-9]".to_string())];
        assert_eq!(expand_definitions("{digit}+", &defs), "([0-9])+");
    }

    #[test]
    fn expands_to_fixpoint_across_definitions() {
        let defs = vec![
            ("digit".to_string(), "[0-9]".to_string()),
            ("number".to_string(), "{digit}+".to_string()),
        ];
        assert_eq!(expand_definitions("{number}", &defs), "(([0-9])+)");
    }

    #[test]
    fn leaves_unknown_braces_untouched() {
        let defs: Vec<(String, String)> = vec![];
        assert_eq!(expand_definitions("{unknown}", &defs), "{unknown}");
    }
}
