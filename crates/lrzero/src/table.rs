//! ACTION/GOTO table synthesis with conflict detection.

use crate::grammar::{Grammar, NonterminalID, ProductionID, TerminalID};
use crate::lr0::{Automaton, StateID};
use crate::types::Map;
use crate::util::display_fn;
use std::fmt;

/// A filled ACTION cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(StateID),
    Reduce(ProductionID),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(next) => write!(f, "S{}", next),
            Self::Reduce(p) => write!(f, "r{}", p.into_raw()),
            Self::Accept => f.write_str("Accept"),
        }
    }
}

/// Two actions competed for one ACTION cell; `kept` is what the policy
/// retained and `discarded` what it dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateID,
    pub symbol: TerminalID,
    pub kept: Action,
    pub discarded: Action,
}

impl Conflict {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(
                f,
                "conflict at state {} on symbol `{}`: kept {}, discarded {}",
                self.state,
                g.terminal_name(self.symbol),
                self.kept,
                self.discarded,
            )
        })
    }
}

/// One row of the parse table.
#[derive(Debug, Default)]
pub struct Row {
    pub actions: Map<TerminalID, Action>,
    pub gotos: Map<NonterminalID, StateID>,
}

#[derive(Debug)]
pub struct ParseTable {
    pub states: Map<StateID, Row>,
    /// Every collision the fixed policy resolved, in discovery order.
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Config {
    /// Fail generation on ACTION conflicts instead of resolving them.
    pub strict: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("the grammar is not LR(0): {} conflict(s)", .conflicts.len())]
    Conflicts { conflicts: Vec<Conflict> },
}

/// Fill ACTION and GOTO for every state. Shifts and gotos come straight
/// from the transition map; every complete item contributes `Accept` (the
/// augmented production, on `$`) or a reduction on all terminals.
///
/// Collisions are resolved by a fixed policy: `Accept` beats everything,
/// `Shift` beats `Reduce`, and the first-assigned `Reduce` beats later
/// ones. Each resolution is recorded in [`ParseTable::conflicts`].
pub fn generate(
    g: &Grammar,
    automaton: &Automaton,
    config: Config,
) -> Result<ParseTable, TableError> {
    let mut states = Map::default();
    let mut conflicts = Vec::new();

    for (&id, state) in &automaton.states {
        let mut row = Row::default();

        for (&t, &next) in &state.shifts {
            fill(&mut row.actions, &mut conflicts, id, t, Action::Shift(next));
        }
        for (&n, &next) in &state.gotos {
            row.gotos.insert(n, next);
        }

        for item in &state.items {
            if !item.is_complete(g) {
                continue;
            }
            if item.production == ProductionID::ACCEPT {
                fill(
                    &mut row.actions,
                    &mut conflicts,
                    id,
                    TerminalID::EOI,
                    Action::Accept,
                );
            } else {
                // LR(0) reduces on every terminal, the end marker included.
                for (t, _) in g.terminals() {
                    fill(
                        &mut row.actions,
                        &mut conflicts,
                        id,
                        t,
                        Action::Reduce(item.production),
                    );
                }
            }
        }

        states.insert(id, row);
    }

    if config.strict && !conflicts.is_empty() {
        return Err(TableError::Conflicts { conflicts });
    }
    if !conflicts.is_empty() {
        tracing::debug!("resolved {} table conflict(s)", conflicts.len());
    }
    Ok(ParseTable { states, conflicts })
}

fn fill(
    actions: &mut Map<TerminalID, Action>,
    conflicts: &mut Vec<Conflict>,
    state: StateID,
    symbol: TerminalID,
    action: Action,
) {
    let Some(&incumbent) = actions.get(&symbol) else {
        actions.insert(symbol, action);
        return;
    };
    if incumbent == action {
        return;
    }

    let kept = resolve(incumbent, action);
    let discarded = if kept == incumbent { action } else { incumbent };
    conflicts.push(Conflict {
        state,
        symbol,
        kept,
        discarded,
    });
    actions.insert(symbol, kept);
}

fn resolve(incumbent: Action, candidate: Action) -> Action {
    use Action::*;
    match (incumbent, candidate) {
        (Accept, _) | (_, Accept) => Accept,
        (Shift(next), Reduce(_)) | (Reduce(_), Shift(next)) => Shift(next),
        // Reduce/reduce: the first assignment stays.
        (first @ Reduce(_), Reduce(_)) => first,
        // Two shifts cannot collide; the transition map is a function.
        (first @ Shift(_), Shift(_)) => first,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::lr0;

    fn build(source: &str) -> (Grammar, ParseTable) {
        let g = Grammar::load(source).unwrap().grammar;
        let automaton = lr0::automaton(&g);
        let table = generate(&g, &automaton, Config::default()).unwrap();
        (g, table)
    }

    #[test]
    fn conflict_free_grammar_reports_nothing() {
        let (_, table) = build("S -> A B\nA -> a\nB -> b\n");
        assert!(table.conflicts.is_empty());
    }

    #[test]
    fn accept_lands_on_the_end_marker() {
        let (_g, table) = build("S -> a\n");

        let accepting: Vec<&Row> = table
            .states
            .values()
            .filter(|row| row.actions.get(&TerminalID::EOI) == Some(&Action::Accept))
            .collect();
        assert_eq!(accepting.len(), 1);
        // The accepting state has no other action.
        assert_eq!(accepting[0].actions.len(), 1);
    }

    #[test]
    fn reductions_cover_every_terminal() {
        let (g, table) = build("S -> a\n");

        let reducing = table
            .states
            .values()
            .find(|row| {
                row.actions
                    .values()
                    .any(|a| matches!(a, Action::Reduce(_)))
            })
            .expect("a reducing state");
        for (t, _) in g.terminals() {
            assert!(matches!(reducing.actions.get(&t), Some(Action::Reduce(_))));
        }
    }

    #[test]
    fn shift_wins_over_reduce() {
        // The state holding `S -> a .` also shifts on `a`.
        let (g, table) = build("S -> a S\nS -> a\n");

        let a = g.terminal_by_name("a").unwrap();
        let conflict = table
            .conflicts
            .iter()
            .find(|c| c.symbol == a)
            .expect("a conflict on `a`");
        assert!(matches!(conflict.kept, Action::Shift(_)));
        assert!(matches!(conflict.discarded, Action::Reduce(_)));

        let row = &table.states[&conflict.state];
        assert!(matches!(row.actions.get(&a), Some(Action::Shift(_))));
    }

    #[test]
    fn first_reduce_wins_over_later_ones() {
        // `A -> a .` and `B -> a .` share a state; A's production has the
        // lower index and must be kept on every terminal.
        let (g, table) = build("S -> A\nS -> B\nA -> a\nB -> a\n");

        let reduce_reduce: Vec<&Conflict> = table
            .conflicts
            .iter()
            .filter(|c| {
                matches!(c.kept, Action::Reduce(_)) && matches!(c.discarded, Action::Reduce(_))
            })
            .collect();
        // One collision per terminal: `$` and `a`.
        assert_eq!(reduce_reduce.len(), 2);
        for conflict in reduce_reduce {
            let Action::Reduce(kept) = conflict.kept else {
                unreachable!()
            };
            let Action::Reduce(discarded) = conflict.discarded else {
                unreachable!()
            };
            assert!(kept < discarded);
            assert_eq!(
                g.production(kept).display(&g).to_string(),
                "A -> a"
            );
        }
    }

    #[test]
    fn strict_mode_turns_conflicts_into_errors() {
        let g = Grammar::load("S -> a S\nS -> a\n").unwrap().grammar;
        let automaton = lr0::automaton(&g);

        let err = generate(&g, &automaton, Config { strict: true }).unwrap_err();
        let TableError::Conflicts { conflicts } = err;
        assert!(!conflicts.is_empty());
    }

    #[test]
    fn action_cells_render_like_the_console_table() {
        assert_eq!(Action::Shift(StateID::INITIAL).to_string(), "S0");
        assert_eq!(Action::Accept.to_string(), "Accept");
    }
}
