//! Construction invariants of the canonical collection and the tables.

use lrzero::grammar::{Grammar, ProductionID, SymbolID};
use lrzero::lr0::{self, Automaton, Item, StateID};
use lrzero::report;
use lrzero::table::{self, Action, Config, ParseTable};
use lrzero::types::Set;

const EXPR: &str = "\
E -> E + T
E -> T
T -> T * F
T -> F
F -> ( E )
F -> id
";

const PAIRS: &str = "\
S -> A A
A -> a A
A -> b
";

const DANGLING_ELSE: &str = "\
S -> i S e S
S -> i S
S -> a
";

const REPEATED_PREFIX: &str = "\
S -> a S
S -> a
";

fn build(source: &str) -> (Grammar, Automaton, ParseTable) {
    let loaded = Grammar::load(source).unwrap();
    assert!(loaded.skipped.is_empty());
    let automaton = lr0::automaton(&loaded.grammar);
    let table = table::generate(&loaded.grammar, &automaton, Config::default()).unwrap();
    (loaded.grammar, automaton, table)
}

#[test]
fn every_state_is_closed() {
    let (g, automaton, _) = build(EXPR);

    for state in automaton.states.values() {
        let items: Set<Item> = state.items.iter().copied().collect();
        assert_eq!(lr0::closure(&g, &items), items);
    }
}

#[test]
fn transitions_agree_with_goto() {
    let (g, automaton, _) = build(EXPR);

    for state in automaton.states.values() {
        let items: Set<Item> = state.items.iter().copied().collect();

        let transitions = state
            .shifts
            .iter()
            .map(|(&t, &next)| (SymbolID::T(t), next))
            .chain(state.gotos.iter().map(|(&n, &next)| (SymbolID::N(n), next)));
        for (symbol, next) in transitions {
            assert_eq!(state.transition(symbol), Some(next));

            let mut expected: Vec<Item> = lr0::goto(&g, &items, symbol).into_iter().collect();
            expected.sort_unstable();
            assert_eq!(automaton.state(next).items, expected);
        }
    }
}

#[test]
fn state_ids_are_contiguous_from_the_initial_state() {
    let (g, automaton, _) = build(EXPR);

    let raws: Vec<u16> = automaton.states.keys().map(|id| id.into_raw()).collect();
    let expected: Vec<u16> = (0..automaton.states.len() as u16).collect();
    assert_eq!(raws, expected);

    let mut seed = Set::default();
    seed.insert(Item {
        production: ProductionID::ACCEPT,
        dot: 0,
    });
    let mut start: Vec<Item> = lr0::closure(&g, &seed).into_iter().collect();
    start.sort_unstable();
    assert_eq!(automaton.state(StateID::INITIAL).items, start);
}

#[test]
fn terminals_and_nonterminals_are_disjoint() {
    let (g, _, _) = build(EXPR);

    let terminals: Vec<&str> = g.terminals().map(|(_, name)| name).collect();
    let nonterminals: Vec<&str> = g.nonterminals().map(|(_, name)| name).collect();

    assert!(terminals.contains(&"$"));
    assert!(!nonterminals.contains(&"$"));
    assert!(terminals.iter().all(|t| !nonterminals.contains(t)));
}

#[test]
fn pair_grammar_builds_seven_conflict_free_states() {
    let (_, automaton, table) = build(PAIRS);

    assert_eq!(automaton.states.len(), 7);
    assert!(table.conflicts.is_empty());
}

#[test]
fn rebuilding_yields_identical_tables() {
    let (first_grammar, _, first) = build(EXPR);
    let (second_grammar, _, second) = build(EXPR);

    assert_eq!(
        report::parse_table(&first_grammar, &first).to_string(),
        report::parse_table(&second_grammar, &second).to_string(),
    );
    assert_eq!(first.conflicts, second.conflicts);
}

#[test]
fn dangling_else_conflict_prefers_the_shift() {
    let (g, automaton, table) = build(DANGLING_ELSE);

    let e = g.terminal_by_name("e").unwrap();
    let conflict = table
        .conflicts
        .iter()
        .find(|c| c.symbol == e)
        .expect("a conflict on `e`");
    assert!(matches!(conflict.kept, Action::Shift(_)));
    assert!(matches!(conflict.discarded, Action::Reduce(_)));

    // The conflicting state holds both the shiftable and the complete item.
    let rendered: Vec<String> = automaton
        .state(conflict.state)
        .items
        .iter()
        .map(|item| item.display(&g).to_string())
        .collect();
    assert!(rendered.contains(&"S -> i S . e S".to_owned()));
    assert!(rendered.contains(&"S -> i S .".to_owned()));
}

#[test]
fn repeated_prefix_conflict_is_reported_deterministically() {
    let (g, _, table) = build(REPEATED_PREFIX);

    let a = g.terminal_by_name("a").unwrap();
    assert!(table.conflicts.iter().any(|c| c.symbol == a));

    let (_, _, again) = build(REPEATED_PREFIX);
    assert_eq!(table.conflicts, again.conflicts);
}
