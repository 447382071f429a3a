//! Per-state LR(0) conflict detection.
//!
//! A grammar is LR(0) exactly when no state of its automaton mixes actions:
//! every item of a state is grouped by the symbol just before its dot (the
//! `ε` sentinel when the dot is at the far left), and two items landing on
//! the same group with incompatible actions are a conflict. Conflicts are
//! diagnostics, not failures — the caller may still build the table and
//! inspect the conflicted cells.

use crate::automaton::{Automaton, Item, ItemAction, State, StateID};
use crate::grammar::{Grammar, Symbol};
use crate::types::Map;
use crate::util::display_fn;
use indexmap::map::Entry;
use std::fmt;

/// The outcome of checking one state; at most one conflict is reported per
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDiagnostic {
    pub state: StateID,
    pub conflict: Option<Conflict>,
}

impl StateDiagnostic {
    /// Renders the diagnostic together with the offending state so the
    /// grammar author sees the items that collide.
    pub fn display<'a, 'g: 'a>(&'a self, automaton: &'a Automaton<'g>) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            let grammar = automaton.grammar();
            match &self.conflict {
                None => writeln!(f, "State {}: no conflicts", self.state),
                Some(conflict) => {
                    writeln!(f, "State {}: {}", self.state, conflict)?;
                    let (first, second) = conflict.items();
                    writeln!(f, "  between {}", first.display(grammar))?;
                    writeln!(f, "  and     {}", second.display(grammar))?;
                    write!(f, "{}", automaton.state(self.state).display(grammar))
                }
            }
        })
    }
}

/// Two items of one state demanding incompatible parser actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    #[error("shift/reduce conflict after `{symbol}`")]
    ShiftReduce {
        symbol: Symbol,
        first: Item,
        second: Item,
    },

    #[error("reduce/reduce conflict after `{symbol}`")]
    ReduceReduce {
        symbol: Symbol,
        first: Item,
        second: Item,
    },
}

impl Conflict {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::ShiftReduce { symbol, .. } | Self::ReduceReduce { symbol, .. } => symbol,
        }
    }

    pub fn items(&self) -> (Item, Item) {
        match self {
            Self::ShiftReduce { first, second, .. } | Self::ReduceReduce { first, second, .. } => {
                (*first, *second)
            }
        }
    }
}

/// Checks every state of the automaton, in state order.
///
/// One diagnostic is produced per state so callers can batch-report: a
/// conflicted state never stops the scan of the remaining states.
pub fn check(automaton: &Automaton<'_>) -> Vec<StateDiagnostic> {
    automaton
        .states()
        .iter()
        .map(|state| StateDiagnostic {
            state: state.id(),
            conflict: check_state(automaton.grammar(), state),
        })
        .collect()
}

fn check_state(grammar: &Grammar, state: &State) -> Option<Conflict> {
    let mut first_seen: Map<Symbol, Item> = Map::default();
    for &item in state.items() {
        let key = match item.pre_dot_symbol(grammar) {
            Some(symbol) => symbol.clone(),
            None => Symbol::epsilon(),
        };
        match first_seen.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(item);
            }
            Entry::Occupied(entry) => {
                let first = *entry.get();
                let symbol = entry.key().clone();
                if first.action() != item.action() {
                    return Some(Conflict::ShiftReduce {
                        symbol,
                        first,
                        second: item,
                    });
                }
                if first.action() == ItemAction::Reduce {
                    return Some(Conflict::ReduceReduce {
                        symbol,
                        first,
                        second: item,
                    });
                }
            }
        }
    }
    None
}
