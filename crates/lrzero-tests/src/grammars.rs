//! Grammar definitions for integration tests.

use lrzero::grammar::{Grammar, GrammarError};

/// The classic expression grammar:
///
/// ```text
/// exp    -> exp + term | term
/// term   -> term * factor | factor
/// factor -> ( exp ) | number
/// ```
///
/// SLR(1) but not LR(0): several states mix a completed rule with a pending
/// shift.
pub fn arithmetic() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::builder();
    g.rule("exp", ["exp", "+", "term"])
        .rule("exp", ["term"])
        .rule("term", ["term", "*", "factor"])
        .rule("term", ["factor"])
        .rule("factor", ["(", "exp", ")"])
        .rule("factor", ["number"]);
    g.build()
}

/// Nested parentheses; a grammar that genuinely is LR(0).
pub fn nested_parens() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::builder();
    g.rule("pair", ["(", "pair", ")"]).rule("pair", ["(", ")"]);
    g.build()
}

/// After shifting `id` the parser can either keep going on `+` or reduce to
/// `factor`, so the automaton has a shift/reduce conflict.
pub fn shift_reduce() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::builder();
    g.rule("cycle", ["id", "+", "id"])
        .rule("cycle", ["factor"])
        .rule("factor", ["(", "cycle", ")"])
        .rule("factor", ["id"]);
    g.build()
}

/// Two non-terminals deriving the same terminal string, forcing a
/// reduce/reduce conflict after `c`.
pub fn reduce_reduce() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::builder();
    g.rule("start", ["first"])
        .rule("start", ["second"])
        .rule("first", ["c"])
        .rule("second", ["c"]);
    g.build()
}

/// A somewhat larger statement-list grammar, mainly for the benchmarks.
pub fn statements() -> Result<Grammar, GrammarError> {
    let mut g = Grammar::builder();
    g.rule("program", ["begin", "stmts", "end"])
        .rule("stmts", ["stmt"])
        .rule("stmts", ["stmts", "stmt"])
        .rule("stmt", ["id", "=", "exp", ";"])
        .rule("stmt", ["print", "exp", ";"])
        .rule("exp", ["exp", "+", "atom"])
        .rule("exp", ["exp", "-", "atom"])
        .rule("exp", ["atom"])
        .rule("atom", ["id"])
        .rule("atom", ["num"])
        .rule("atom", ["(", "exp", ")"]);
    g.build()
}
