//! Thin tracing helpers shared by every pipeline phase. Each phase owns its
//! own `tracing::debug!`/`tracing::trace!` calls; this module only collects
//! the span-naming convention so phase names read the same everywhere a
//! caller configures a subscriber.

pub const PHASE_A_REGEX_LEXER: &str = "regex_lexer";
pub const PHASE_B_SHUNTING_YARD: &str = "shunting_yard";
pub const PHASE_C_SYNTAX_TREE: &str = "syntax_tree";
pub const PHASE_D_DFA_BUILDER: &str = "dfa_builder";
pub const PHASE_E_MINIMIZER: &str = "minimizer";
pub const PHASE_F_COMPILER: &str = "compiler";
pub const PHASE_G_SCANNER: &str = "scanner";
