//! ACTION/GOTO table construction.
//!
//! The table is the dense, runtime-facing form of the automaton: one row per
//! state, one ACTION column per terminal (`$` included) and one GOTO column
//! per non-terminal except `S'`. Conflicting writes are kept, not resolved —
//! a conflict cell lists every distinct action so the grammar author can see
//! exactly what collided.

use crate::automaton::{Automaton, ItemAction, StateID};
use crate::grammar::{Grammar, RuleID, Symbol};
use crate::util::display_fn;
use std::fmt;

/// A single parser action.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Consume the lookahead and push the given state.
    Shift(StateID),
    /// Apply the given rule, popping its right-hand side.
    Reduce(RuleID),
    /// The input is a complete sentence.
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(state) => write!(f, "s{}", state),
            Self::Reduce(rule) => write!(f, "r{}", rule),
            Self::Accept => f.write_str("acc"),
        }
    }
}

/// One ACTION cell; an empty cell is a parse error at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionCell {
    #[default]
    Empty,
    Single(Action),
    /// Two or more distinct actions were written into the same cell. The
    /// fill order puts the shift, when present, first.
    Conflict(Vec<Action>),
}

impl ActionCell {
    /// Records one more action, widening to a conflict set on collision.
    fn write(&mut self, action: Action) {
        match self {
            Self::Empty => *self = Self::Single(action),
            Self::Single(existing) => {
                if *existing != action {
                    *self = Self::Conflict(vec![*existing, action]);
                }
            }
            Self::Conflict(actions) => {
                if !actions.contains(&action) {
                    actions.push(action);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(..))
    }

    /// The recorded actions: none, one, or the conflict set.
    pub fn actions(&self) -> &[Action] {
        match self {
            Self::Empty => &[],
            Self::Single(action) => std::slice::from_ref(action),
            Self::Conflict(actions) => actions,
        }
    }
}

impl fmt::Display for ActionCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("-"),
            Self::Single(action) => fmt::Display::fmt(action, f),
            Self::Conflict(actions) => {
                for (i, action) in actions.iter().enumerate() {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    fmt::Display::fmt(action, f)?;
                }
                Ok(())
            }
        }
    }
}

/// The ACTION and GOTO tables of an LR(0) automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    actions: Vec<Vec<ActionCell>>,
    gotos: Vec<Vec<Option<StateID>>>,
}

impl ParseTable {
    /// Fills both tables from the automaton.
    ///
    /// Per state, transitions are written first (shift for a terminal label,
    /// goto for a non-terminal), then every complete item: the `S'` item
    /// claims `accept` in the `$` column, and any other complete item writes
    /// its reduction into every terminal column. Occupied cells widen into
    /// conflict sets, so shifts precede reduces inside a conflict.
    #[tracing::instrument(skip_all)]
    pub fn generate(automaton: &Automaton<'_>) -> Self {
        let grammar = automaton.grammar();
        let n_terminals = grammar.terminals().len();
        let n_gotos = grammar.nonterminals().len().saturating_sub(1);
        let n_states = automaton.states().len();
        let eoi = grammar.terminal_index(&Symbol::end_of_input());

        let mut actions = vec![vec![ActionCell::Empty; n_terminals]; n_states];
        let mut gotos = vec![vec![None; n_gotos]; n_states];

        for state in automaton.states() {
            let row = state.id().into_raw();

            for (symbol, target) in state.transitions() {
                if let Some(col) = grammar.terminal_index(symbol) {
                    actions[row][col].write(Action::Shift(*target));
                } else if let Some(col) = grammar.nonterminal_index(symbol) {
                    // `S'` occupies position 0 and never labels a
                    // transition, so the goto columns start at 1.
                    gotos[row][col - 1] = Some(*target);
                }
            }

            for item in state.items() {
                match item.action() {
                    ItemAction::Shift => {}
                    ItemAction::Accept => {
                        if let Some(col) = eoi {
                            actions[row][col].write(Action::Accept);
                        }
                    }
                    ItemAction::Reduce => {
                        for col in 0..n_terminals {
                            actions[row][col].write(Action::Reduce(item.rule()));
                        }
                    }
                }
            }
        }

        let table = Self { actions, gotos };
        tracing::debug!(
            "filled {} rows, {} conflicted cells",
            n_states,
            table.conflicted_cells().count()
        );
        table
    }

    pub fn rows(&self) -> usize {
        self.actions.len()
    }

    /// Number of ACTION columns (`$` included).
    pub fn action_columns(&self) -> usize {
        self.actions.first().map_or(0, Vec::len)
    }

    /// Number of GOTO columns (`S'` excluded).
    pub fn goto_columns(&self) -> usize {
        self.gotos.first().map_or(0, Vec::len)
    }

    /// The ACTION cell for a state and a terminal column.
    pub fn action(&self, state: StateID, terminal: usize) -> &ActionCell {
        &self.actions[state.into_raw()][terminal]
    }

    /// The GOTO target for a state and a non-terminal column (0 is the first
    /// non-terminal after `S'`).
    pub fn goto(&self, state: StateID, nonterminal: usize) -> Option<StateID> {
        self.gotos[state.into_raw()][nonterminal]
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflicted_cells().next().is_some()
    }

    /// All conflict cells as `(state, terminal column, actions)`.
    pub fn conflicted_cells(&self) -> impl Iterator<Item = (StateID, usize, &[Action])> + '_ {
        self.actions.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_conflict())
                .map(move |(col, cell)| (StateID::from_raw(row), col, cell.actions()))
        })
    }

    /// Renders the table as an aligned grid: terminal columns, then
    /// non-terminal columns without `S'`, one row per state, `-` for empty
    /// cells and `/`-joined actions for conflicts.
    pub fn display<'a>(&'a self, grammar: &'a Grammar) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            let mut header: Vec<String> = vec!["state".into()];
            header.extend(grammar.terminals().iter().map(Symbol::to_string));
            header.extend(grammar.nonterminals().iter().skip(1).map(Symbol::to_string));

            let mut grid = vec![header];
            for row in 0..self.rows() {
                let mut line: Vec<String> = vec![row.to_string()];
                line.extend(self.actions[row].iter().map(ActionCell::to_string));
                line.extend(self.gotos[row].iter().map(|cell| match cell {
                    Some(target) => target.to_string(),
                    None => "-".into(),
                }));
                grid.push(line);
            }

            let mut widths = vec![0; grid[0].len()];
            for line in &grid {
                for (i, cell) in line.iter().enumerate() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
            for line in &grid {
                for (i, cell) in line.iter().enumerate() {
                    if i > 0 {
                        f.write_str("  ")?;
                    }
                    if i + 1 == line.len() {
                        f.write_str(cell)?;
                    } else {
                        write!(f, "{:<width$}", cell, width = widths[i])?;
                    }
                }
                writeln!(f)?;
            }
            Ok(())
        })
    }
}
