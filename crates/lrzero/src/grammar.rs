//! Grammar types and the augmentation transform.

use crate::types::Set;
use std::{borrow::Cow, fmt, mem};

/// A named grammar atom.
///
/// A symbol carries nothing but its name; whether it is a terminal or a
/// non-terminal is decided by the [`Grammar`] that owns it. Two names are
/// reserved: `S'` for the start symbol introduced by augmentation and `$` for
/// the end-of-input terminal. The backing string is either borrowed from a
/// `'static` source or owned, so a grammar never ties symbols to the lifetime
/// of its input.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    name: Cow<'static, str>,
}

impl Symbol {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    /// The fresh start symbol `S'` introduced by [`Grammar::into_augmented`].
    pub const fn augmented_start() -> Self {
        Self {
            name: Cow::Borrowed("S'"),
        }
    }

    /// The end-of-input terminal `$` appended by [`Grammar::into_augmented`].
    pub const fn end_of_input() -> Self {
        Self {
            name: Cow::Borrowed("$"),
        }
    }

    /// The `ε` sentinel standing for an empty stack prefix in diagnostics.
    pub const fn epsilon() -> Self {
        Self {
            name: Cow::Borrowed("ε"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_augmented_start(&self) -> bool {
        self.name == "S'"
    }

    pub fn is_end_of_input(&self) -> bool {
        self.name == "$"
    }
}

impl From<&'static str> for Symbol {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.name, f)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Identifies a rule by its position in [`Grammar::rules`].
///
/// The raw index doubles as the reduction number in the parse table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RuleID {
    raw: usize,
}

impl RuleID {
    /// The augmented start rule `S' -> S`, always at position 0 of an
    /// augmented grammar.
    pub const START: Self = Self::from_raw(0);

    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> usize {
        self.raw
    }
}

impl fmt::Display for RuleID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// A production rule `lhs -> s1 s2 ... sn` with `n >= 1`.
///
/// Identity is the symbol sequence: two rules compare equal iff their
/// left-hand sides and their right-hand sides match symbol by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    lhs: Symbol,
    rhs: Vec<Symbol>,
}

impl Rule {
    pub fn new<I>(lhs: impl Into<Symbol>, rhs: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let lhs = lhs.into();
        let rhs: Vec<Symbol> = rhs.into_iter().map(Into::into).collect();
        if rhs.is_empty() {
            return Err(GrammarError::EmptyRhs(lhs));
        }
        Ok(Self { lhs, rhs })
    }

    pub fn lhs(&self) -> &Symbol {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// Errors detected while constructing or validating a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("no production rules were supplied")]
    EmptyRules,

    #[error("the grammar has no terminal symbols")]
    EmptyTerminals,

    #[error("the grammar has no non-terminal symbols")]
    EmptyNonTerminals,

    #[error("terminal symbol `{0}` is declared more than once")]
    DuplicateTerminal(Symbol),

    #[error("non-terminal symbol `{0}` is declared more than once")]
    DuplicateNonTerminal(Symbol),

    #[error("symbol `{0}` is declared both terminal and non-terminal")]
    OverlapBetweenSets(Symbol),

    #[error("rule left-hand side `{0}` is a terminal symbol")]
    LhsIsTerminal(Symbol),

    #[error("rule left-hand side `{0}` is not a non-terminal symbol")]
    LhsIsNotNonTerminal(Symbol),

    #[error("symbol `{0}` on a right-hand side is neither terminal nor non-terminal")]
    UnknownSymbolInRhs(Symbol),

    #[error("start symbol `{0}` does not appear on any rule's left-hand side")]
    StartSymbolNotFoundInRules(Symbol),

    #[error("start symbol `{0}` is not a non-terminal symbol")]
    StartSymbolIsNotNonTerminal(Symbol),

    #[error("non-terminal `{0}` is unreachable from the start symbol")]
    UnreachableNonTerminal(Symbol),

    #[error("non-terminal `{0}` cannot derive any terminal string")]
    NonProductiveNonTerminal(Symbol),

    #[error("rule for `{0}` has an empty right-hand side")]
    EmptyRhs(Symbol),

    #[error("the grammar has not been augmented")]
    GrammarIsNotAugmented,
}

/// An owning grammar: start symbol, classified symbol sets and rules.
///
/// The positions of symbols inside `terminals` and `nonterminals` are
/// significant: they are the column numbers of the parse table. Both sets are
/// filled in first-occurrence order while scanning the rules, so identical
/// rule lists always produce identical grammars.
#[derive(Debug, Clone)]
pub struct Grammar {
    start: Symbol,
    terminals: Set<Symbol>,
    nonterminals: Set<Symbol>,
    rules: Vec<Rule>,
    augmented: bool,
}

impl Grammar {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Builds a grammar by scanning `rules` once.
    ///
    /// The left-hand sides form the non-terminal set; every other symbol
    /// appearing on a right-hand side is a terminal. The start symbol is the
    /// first rule's left-hand side.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::EmptyRules);
        }
        let mut builder = Self::builder();
        for rule in rules {
            let Rule { lhs, rhs } = rule;
            builder.rule(lhs, rhs);
        }
        builder.build()
    }

    pub fn start(&self) -> &Symbol {
        &self.start
    }

    pub fn terminals(&self) -> &Set<Symbol> {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &Set<Symbol> {
        &self.nonterminals
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleID) -> &Rule {
        &self.rules[id.into_raw()]
    }

    pub fn is_augmented(&self) -> bool {
        self.augmented
    }

    pub fn is_terminal(&self, symbol: &Symbol) -> bool {
        self.terminals.contains(symbol)
    }

    /// The table column assigned to a terminal.
    pub fn terminal_index(&self, symbol: &Symbol) -> Option<usize> {
        self.terminals.get_index_of(symbol)
    }

    /// The position of a non-terminal; in an augmented grammar, `S'` is
    /// always at position 0.
    pub fn nonterminal_index(&self, symbol: &Symbol) -> Option<usize> {
        self.nonterminals.get_index_of(symbol)
    }

    /// The augmented start rule `S' -> S`.
    pub fn start_rule(&self) -> Result<&Rule, GrammarError> {
        if !self.augmented {
            return Err(GrammarError::GrammarIsNotAugmented);
        }
        Ok(&self.rules[RuleID::START.into_raw()])
    }

    /// Checks the structural invariants of this grammar.
    ///
    /// Both construction paths run this before handing out a grammar, so a
    /// `Grammar` value in caller hands has already passed. It stays public
    /// for callers that mutate nothing but still want the receipt.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::EmptyRules);
        }
        if self.terminals.is_empty() {
            return Err(GrammarError::EmptyTerminals);
        }
        if self.nonterminals.is_empty() {
            return Err(GrammarError::EmptyNonTerminals);
        }
        for symbol in &self.terminals {
            if self.nonterminals.contains(symbol) {
                return Err(GrammarError::OverlapBetweenSets(symbol.clone()));
            }
        }
        for rule in &self.rules {
            if rule.rhs().is_empty() {
                return Err(GrammarError::EmptyRhs(rule.lhs().clone()));
            }
            if self.terminals.contains(rule.lhs()) {
                return Err(GrammarError::LhsIsTerminal(rule.lhs().clone()));
            }
            if !self.nonterminals.contains(rule.lhs()) {
                return Err(GrammarError::LhsIsNotNonTerminal(rule.lhs().clone()));
            }
            for symbol in rule.rhs() {
                if !self.terminals.contains(symbol) && !self.nonterminals.contains(symbol) {
                    return Err(GrammarError::UnknownSymbolInRhs(symbol.clone()));
                }
            }
        }
        if self.terminals.contains(&self.start) {
            return Err(GrammarError::StartSymbolIsNotNonTerminal(self.start.clone()));
        }
        if !self.nonterminals.contains(&self.start) {
            return Err(GrammarError::StartSymbolNotFoundInRules(self.start.clone()));
        }
        if !self.rules.iter().any(|rule| rule.lhs() == &self.start) {
            return Err(GrammarError::StartSymbolNotFoundInRules(self.start.clone()));
        }
        self.check_reachability()?;
        self.check_productivity()?;
        Ok(())
    }

    /// Marks every non-terminal reachable from the start symbol, then
    /// reports the first one that was never reached.
    fn check_reachability(&self) -> Result<(), GrammarError> {
        let mut reached = bit_set::BitSet::with_capacity(self.nonterminals.len());
        if let Some(start) = self.nonterminals.get_index_of(&self.start) {
            reached.insert(start);
        }

        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.rules {
                match self.nonterminals.get_index_of(rule.lhs()) {
                    Some(index) if reached.contains(index) => {}
                    _ => continue,
                }
                for symbol in rule.rhs() {
                    if let Some(index) = self.nonterminals.get_index_of(symbol) {
                        changed |= reached.insert(index);
                    }
                }
            }
        }

        for (index, symbol) in self.nonterminals.iter().enumerate() {
            if !reached.contains(index) {
                return Err(GrammarError::UnreachableNonTerminal(symbol.clone()));
            }
        }
        Ok(())
    }

    /// Fixpoint over "the right-hand side derives a terminal string"; any
    /// non-terminal left outside the fixpoint can never finish a derivation.
    fn check_productivity(&self) -> Result<(), GrammarError> {
        let mut productive = bit_set::BitSet::with_capacity(self.nonterminals.len());

        let mut changed = true;
        while changed {
            changed = false;
            for rule in &self.rules {
                let lhs = match self.nonterminals.get_index_of(rule.lhs()) {
                    Some(index) if !productive.contains(index) => index,
                    _ => continue,
                };
                let rhs_productive = rule.rhs().iter().all(|symbol| {
                    self.terminals.contains(symbol)
                        || self
                            .nonterminals
                            .get_index_of(symbol)
                            .is_some_and(|index| productive.contains(index))
                });
                if rhs_productive {
                    productive.insert(lhs);
                    changed = true;
                }
            }
        }

        for (index, symbol) in self.nonterminals.iter().enumerate() {
            if !productive.contains(index) {
                return Err(GrammarError::NonProductiveNonTerminal(symbol.clone()));
            }
        }
        Ok(())
    }

    /// Consumes this grammar and returns its augmented form.
    ///
    /// `S'` becomes non-terminal 0, `$` the last terminal, and `S' -> S`
    /// rule 0, giving the automaton a unique accepting configuration. The
    /// move leaves no usable source behind, so the augmented grammar owns
    /// all of its storage. Augmenting an augmented grammar is a no-op.
    pub fn into_augmented(self) -> Grammar {
        if self.augmented {
            return self;
        }

        let mut nonterminals = Set::default();
        nonterminals.insert(Symbol::augmented_start());
        nonterminals.extend(self.nonterminals);

        let mut terminals = self.terminals;
        terminals.insert(Symbol::end_of_input());

        let mut rules = Vec::with_capacity(self.rules.len() + 1);
        rules.push(Rule {
            lhs: Symbol::augmented_start(),
            rhs: vec![self.start.clone()],
        });
        rules.extend(self.rules);

        Grammar {
            start: Symbol::augmented_start(),
            terminals,
            nonterminals,
            rules,
            augmented: true,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminals: ")?;
        for (i, symbol) in self.terminals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", symbol)?;
        }
        write!(f, "\nnonterminals: ")?;
        for (i, symbol) in self.nonterminals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", symbol)?;
        }
        writeln!(f, "\nstart: {}", self.start)?;
        writeln!(f, "rules:")?;
        for (i, rule) in self.rules.iter().enumerate() {
            writeln!(f, "  [{:02}] {}", i, rule)?;
        }
        Ok(())
    }
}

/// Collects rules and optional explicit symbol declarations, then produces a
/// validated [`Grammar`].
///
/// Declarations are not required: left-hand sides classify as non-terminals
/// and everything else on a right-hand side as a terminal. Declaring symbols
/// up front turns typos into construction errors instead of silently minting
/// new terminals. Table column order is always the first-occurrence order in
/// the rules, independent of declaration order.
#[derive(Debug, Default)]
pub struct Builder {
    terminals: Vec<Symbol>,
    nonterminals: Vec<Symbol>,
    rules: Vec<(Symbol, Vec<Symbol>)>,
    start: Option<Symbol>,
}

impl Builder {
    /// Declare a terminal symbol.
    pub fn terminal(&mut self, name: impl Into<Symbol>) -> &mut Self {
        self.terminals.push(name.into());
        self
    }

    /// Declare several terminal symbols at once.
    pub fn terminals(&mut self, names: &[&'static str]) -> &mut Self {
        self.terminals.extend(names.iter().copied().map(Symbol::from));
        self
    }

    /// Declare a non-terminal symbol.
    pub fn nonterminal(&mut self, name: impl Into<Symbol>) -> &mut Self {
        self.nonterminals.push(name.into());
        self
    }

    /// Register a production rule.
    pub fn rule<I>(&mut self, lhs: impl Into<Symbol>, rhs: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        self.rules
            .push((lhs.into(), rhs.into_iter().map(Into::into).collect()));
        self
    }

    /// Override the start symbol; defaults to the first rule's left-hand
    /// side.
    pub fn start(&mut self, name: impl Into<Symbol>) -> &mut Self {
        self.start.replace(name.into());
        self
    }

    pub fn build(&mut self) -> Result<Grammar, GrammarError> {
        let Self {
            terminals: declared_terminals,
            nonterminals: declared_nonterminals,
            rules,
            start,
        } = mem::take(self);

        if rules.is_empty() {
            return Err(GrammarError::EmptyRules);
        }

        let mut terminal_decls = Set::default();
        for symbol in declared_terminals {
            if !terminal_decls.insert(symbol.clone()) {
                return Err(GrammarError::DuplicateTerminal(symbol));
            }
        }
        let mut nonterminal_decls = Set::default();
        for symbol in declared_nonterminals {
            if !nonterminal_decls.insert(symbol.clone()) {
                return Err(GrammarError::DuplicateNonTerminal(symbol));
            }
        }
        for symbol in &terminal_decls {
            if nonterminal_decls.contains(symbol) {
                return Err(GrammarError::OverlapBetweenSets(symbol.clone()));
            }
        }

        let lhs_set: Set<&Symbol> = rules.iter().map(|(lhs, _)| lhs).collect();
        for (lhs, rhs) in &rules {
            if rhs.is_empty() {
                return Err(GrammarError::EmptyRhs(lhs.clone()));
            }
            if terminal_decls.contains(lhs) {
                return Err(GrammarError::LhsIsTerminal(lhs.clone()));
            }
            if !nonterminal_decls.is_empty() && !nonterminal_decls.contains(lhs) {
                return Err(GrammarError::LhsIsNotNonTerminal(lhs.clone()));
            }
        }

        // Classify in first-occurrence order: the lhs is recorded first,
        // then each rhs symbol, splitting on membership in the lhs set.
        let mut terminals = Set::default();
        let mut nonterminals = Set::default();
        for (lhs, rhs) in &rules {
            nonterminals.insert(lhs.clone());
            for symbol in rhs {
                if lhs_set.contains(symbol) || nonterminal_decls.contains(symbol) {
                    nonterminals.insert(symbol.clone());
                } else {
                    if !terminal_decls.is_empty() && !terminal_decls.contains(symbol) {
                        return Err(GrammarError::UnknownSymbolInRhs(symbol.clone()));
                    }
                    terminals.insert(symbol.clone());
                }
            }
        }

        // Declared symbols that never occurred still belong to the alphabet;
        // they take the columns after all first-seen ones.
        for symbol in terminal_decls {
            terminals.insert(symbol);
        }
        for symbol in nonterminal_decls {
            nonterminals.insert(symbol);
        }

        let start = match start {
            Some(start) => start,
            None => rules[0].0.clone(),
        };

        let rules = rules
            .into_iter()
            .map(|(lhs, rhs)| Rule { lhs, rhs })
            .collect();

        let grammar = Grammar {
            start,
            terminals,
            nonterminals,
            rules,
            augmented: false,
        };
        grammar.validate()?;
        Ok(grammar)
    }
}
