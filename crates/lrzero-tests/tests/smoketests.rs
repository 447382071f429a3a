use lrzero::{
    automaton::{Automaton, Item, State, StateID},
    grammar::{Grammar, GrammarError, Rule, RuleID, Symbol},
    table::{Action, ActionCell, ParseTable},
    types::Set,
    validate::{self, Conflict},
};
use lrzero_tests::grammars;

fn smoketest(grammar: Result<Grammar, GrammarError>) {
    let grammar = grammar.unwrap().into_augmented();
    eprintln!("grammar:\n{}", grammar);
    let automaton = Automaton::generate(&grammar).unwrap();
    eprintln!("automaton:\n---\n{}", automaton);
    for diagnostic in validate::check(&automaton) {
        eprintln!("{}", diagnostic.display(&automaton));
    }
    let table = ParseTable::generate(&automaton);
    eprintln!("table:\n---\n{}", table.display(&grammar));
}

#[test]
fn smoketest_arithmetic() {
    smoketest(grammars::arithmetic());
}

#[test]
fn smoketest_nested_parens() {
    smoketest(grammars::nested_parens());
}

#[test]
fn smoketest_shift_reduce() {
    smoketest(grammars::shift_reduce());
}

#[test]
fn smoketest_reduce_reduce() {
    smoketest(grammars::reduce_reduce());
}

#[test]
fn smoketest_statements() {
    smoketest(grammars::statements());
}

/// Looks up the unique state holding exactly `items`.
fn find_state<'a>(
    automaton: &'a Automaton<'_>,
    items: impl IntoIterator<Item = Item>,
) -> &'a State {
    let expected: Set<Item> = items.into_iter().collect();
    automaton
        .states()
        .iter()
        .find(|state| state.items() == &expected)
        .expect("no state holds the requested item set")
}

#[test]
fn arithmetic_symbol_order_pins_the_columns() {
    let grammar = grammars::arithmetic().unwrap();
    let terminals: Vec<_> = grammar.terminals().iter().map(Symbol::name).collect();
    assert_eq!(terminals, ["+", "*", "(", ")", "number"]);
    let nonterminals: Vec<_> = grammar.nonterminals().iter().map(Symbol::name).collect();
    assert_eq!(nonterminals, ["exp", "term", "factor"]);

    let grammar = grammar.into_augmented();
    let terminals: Vec<_> = grammar.terminals().iter().map(Symbol::name).collect();
    assert_eq!(terminals, ["+", "*", "(", ")", "number", "$"]);
    let nonterminals: Vec<_> = grammar.nonterminals().iter().map(Symbol::name).collect();
    assert_eq!(nonterminals, ["S'", "exp", "term", "factor"]);
}

#[test]
fn arithmetic_has_the_classic_twelve_states() {
    let grammar = grammars::arithmetic().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    assert_eq!(automaton.states().len(), 12);
}

#[test]
fn arithmetic_is_not_lr0() {
    let grammar = grammars::arithmetic().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    let diagnostics = validate::check(&automaton);

    // exp -> term •  vs  term -> term • * factor, both grouped under `term`.
    let state = find_state(
        &automaton,
        [
            Item::new(&grammar, RuleID::from_raw(2), 1),
            Item::new(&grammar, RuleID::from_raw(3), 1),
        ],
    );
    match &diagnostics[state.id().into_raw()].conflict {
        Some(Conflict::ShiftReduce { symbol, .. }) => assert_eq!(symbol.name(), "term"),
        other => panic!("expected a shift/reduce conflict, got {:?}", other),
    }

    let conflicted = diagnostics
        .iter()
        .filter(|d| d.conflict.is_some())
        .count();
    assert_eq!(conflicted, 3);
}

#[test]
fn shifted_id_conflicts_between_shift_and_reduce() {
    let grammar = grammars::shift_reduce().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    let diagnostics = validate::check(&automaton);

    // cycle -> id • + id  vs  factor -> id •
    let state = find_state(
        &automaton,
        [
            Item::new(&grammar, RuleID::from_raw(1), 1),
            Item::new(&grammar, RuleID::from_raw(4), 1),
        ],
    );
    match &diagnostics[state.id().into_raw()].conflict {
        Some(Conflict::ShiftReduce { symbol, .. }) => assert_eq!(symbol.name(), "id"),
        other => panic!("expected a shift/reduce conflict, got {:?}", other),
    }

    // The conflicted cell sits on `+`: the shift is recorded first, then the
    // reduction of `factor -> id`.
    let table = ParseTable::generate(&automaton);
    let plus = grammar.terminal_index(&Symbol::new("+")).unwrap();
    let cell = table.action(state.id(), plus);
    assert!(cell.is_conflict());
    assert!(matches!(cell.actions()[0], Action::Shift(_)));
    assert_eq!(cell.actions()[1], Action::Reduce(RuleID::from_raw(4)));
}

#[test]
fn competing_reductions_conflict_after_c() {
    let grammar = grammars::reduce_reduce().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    let diagnostics = validate::check(&automaton);

    // first -> c •  vs  second -> c •
    let state = find_state(
        &automaton,
        [
            Item::new(&grammar, RuleID::from_raw(3), 1),
            Item::new(&grammar, RuleID::from_raw(4), 1),
        ],
    );
    match &diagnostics[state.id().into_raw()].conflict {
        Some(Conflict::ReduceReduce { symbol, .. }) => assert_eq!(symbol.name(), "c"),
        other => panic!("expected a reduce/reduce conflict, got {:?}", other),
    }

    // Every terminal column of that row collects both reductions.
    let table = ParseTable::generate(&automaton);
    for col in 0..table.action_columns() {
        assert_eq!(
            table.action(state.id(), col).actions(),
            [
                Action::Reduce(RuleID::from_raw(3)),
                Action::Reduce(RuleID::from_raw(4)),
            ]
        );
    }
}

#[test]
fn augmentation_grows_each_set_by_one() {
    for grammar in [
        grammars::arithmetic(),
        grammars::nested_parens(),
        grammars::shift_reduce(),
        grammars::reduce_reduce(),
        grammars::statements(),
    ] {
        let grammar = grammar.unwrap();
        let rules = grammar.rules().len();
        let terminals = grammar.terminals().len();
        let nonterminals = grammar.nonterminals().len();
        let prior_start = grammar.start().clone();

        let augmented = grammar.into_augmented();
        assert_eq!(augmented.rules().len(), rules + 1);
        assert_eq!(augmented.terminals().len(), terminals + 1);
        assert_eq!(augmented.nonterminals().len(), nonterminals + 1);

        assert_eq!(augmented.nonterminals().first(), Some(&Symbol::augmented_start()));
        assert_eq!(augmented.terminals().last(), Some(&Symbol::end_of_input()));
        let start_rule = augmented.start_rule().unwrap();
        assert!(start_rule.lhs().is_augmented_start());
        assert_eq!(start_rule.rhs(), [prior_start]);
    }
}

#[test]
fn from_rules_builds_the_same_grammar_as_the_builder() {
    let rules = vec![
        Rule::new("pair", ["(", "pair", ")"]).unwrap(),
        Rule::new("pair", ["(", ")"]).unwrap(),
    ];
    let from_rules = Grammar::from_rules(rules).unwrap();
    let built = grammars::nested_parens().unwrap();
    assert_eq!(from_rules.to_string(), built.to_string());
}

#[test]
fn the_whole_pipeline_is_deterministic() {
    let run = || {
        let grammar = grammars::arithmetic().unwrap().into_augmented();
        let automaton = Automaton::generate(&grammar).unwrap();
        let diagnostics = validate::check(&automaton);
        let table = ParseTable::generate(&automaton);
        let result = (
            grammar.to_string(),
            automaton.to_string(),
            diagnostics,
            table.display(&grammar).to_string(),
        );
        result
    };
    assert_eq!(run(), run());
}

#[test]
fn no_two_states_share_an_item_set() {
    let grammar = grammars::arithmetic().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    for (i, left) in automaton.states().iter().enumerate() {
        for right in &automaton.states()[i + 1..] {
            assert_ne!(left.items(), right.items());
        }
    }
}

#[test]
fn every_transition_target_projects_from_its_source() {
    let grammar = grammars::arithmetic().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    for state in automaton.states() {
        for (symbol, target) in state.transitions() {
            for item in automaton.state(*target).items() {
                if item.dot() == 0 {
                    // Closure expansion of an advanced item.
                    continue;
                }
                let projected = state.items().iter().any(|source| {
                    source.dot_symbol(&grammar) == Some(symbol)
                        && source.advance(&grammar) == *item
                });
                assert!(
                    projected,
                    "item {} in state {} does not project from state {} on {}",
                    item.display(&grammar),
                    target,
                    state.id(),
                    symbol
                );
            }
        }
    }
}

#[test]
fn exactly_one_state_accepts_at_end_of_input() {
    for grammar in [grammars::arithmetic(), grammars::nested_parens()] {
        let grammar = grammar.unwrap().into_augmented();
        let automaton = Automaton::generate(&grammar).unwrap();
        let accept_item = Item::new(&grammar, RuleID::START, 1);

        let accepting: Vec<StateID> = automaton
            .states()
            .iter()
            .filter(|state| state.items().contains(&accept_item))
            .map(|state| state.id())
            .collect();
        assert_eq!(accepting.len(), 1);

        let table = ParseTable::generate(&automaton);
        let eoi = grammar.terminal_index(&Symbol::end_of_input()).unwrap();
        assert_eq!(
            table.action(accepting[0], eoi),
            &ActionCell::Single(Action::Accept)
        );
    }
}

#[test]
fn table_dimensions_follow_the_grammar() {
    let grammar = grammars::arithmetic().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    let table = ParseTable::generate(&automaton);

    assert_eq!(table.rows(), automaton.states().len());
    assert_eq!(table.action_columns(), grammar.terminals().len());
    assert_eq!(table.goto_columns(), grammar.nonterminals().len() - 1);
}

#[test]
fn conflicted_cells_only_appear_in_flagged_states() {
    for grammar in [
        grammars::arithmetic(),
        grammars::shift_reduce(),
        grammars::reduce_reduce(),
    ] {
        let grammar = grammar.unwrap().into_augmented();
        let automaton = Automaton::generate(&grammar).unwrap();
        let diagnostics = validate::check(&automaton);
        let table = ParseTable::generate(&automaton);

        assert!(table.has_conflicts());
        for (state, _, actions) in table.conflicted_cells() {
            assert!(actions.len() >= 2);
            assert!(
                diagnostics[state.into_raw()].conflict.is_some(),
                "state {} has a conflicted cell but no diagnostic",
                state
            );
        }
    }
}

#[test]
fn lr0_grammar_sails_through_without_conflicts() {
    let grammar = grammars::nested_parens().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();

    let diagnostics = validate::check(&automaton);
    assert!(diagnostics.iter().all(|d| d.conflict.is_none()));

    let table = ParseTable::generate(&automaton);
    assert!(!table.has_conflicts());
}

#[test]
fn goto_column_skips_the_augmented_start() {
    let grammar = grammars::arithmetic().unwrap().into_augmented();
    let automaton = Automaton::generate(&grammar).unwrap();
    let table = ParseTable::generate(&automaton);

    // From state 0, `exp` (the first non-terminal after S') leads to the
    // accepting state.
    let exp = grammar.nonterminal_index(&Symbol::new("exp")).unwrap();
    let target = table.goto(StateID::INITIAL, exp - 1).unwrap();
    let accept_item = Item::new(&grammar, RuleID::START, 1);
    assert!(automaton.state(target).items().contains(&accept_item));
}
