//! LR(0) items, closure/goto, and the canonical collection.

use crate::grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID};
use crate::types::{Map, Set};
use crate::util::display_fn;
use std::{collections::VecDeque, fmt};

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u16);

impl StateID {
    /// The state holding `CLOSURE({S' -> . S})`.
    pub const INITIAL: Self = Self(0);

    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// An LR(0) item: a production with a dot position in `0..=|rhs|`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub production: ProductionID,
    pub dot: u16,
}

impl Item {
    /// The symbol right after the dot, if any.
    pub fn next_symbol(&self, g: &Grammar) -> Option<SymbolID> {
        g.production(self.production)
            .right
            .get(usize::from(self.dot))
            .copied()
    }

    /// Whether the dot sits at the end of the right-hand side.
    pub fn is_complete(&self, g: &Grammar) -> bool {
        usize::from(self.dot) == g.production(self.production).right.len()
    }

    /// Kernel items are the augmented start item and every item whose dot
    /// has moved past the first position.
    pub fn is_kernel(&self) -> bool {
        self.dot > 0 || self.production == ProductionID::ACCEPT
    }

    fn advanced(self) -> Self {
        Self {
            dot: self.dot + 1,
            ..self
        }
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let p = g.production(self.production);
            write!(f, "{} ->", g.nonterminal_name(p.left))?;
            for (i, symbol) in p.right.iter().enumerate() {
                if i == usize::from(self.dot) {
                    f.write_str(" .")?;
                }
                write!(f, " {}", g.symbol_name(*symbol))?;
            }
            if self.is_complete(g) {
                f.write_str(" .")?;
            }
            Ok(())
        })
    }
}

/// Saturate `items` under `A -> α . B β  ⇒  B -> . γ` for every production
/// of B. Epsilon productions contribute complete items directly.
pub fn closure(g: &Grammar, items: &Set<Item>) -> Set<Item> {
    let mut result: Set<Item> = items.iter().copied().collect();
    let mut cursor = 0;
    while cursor < result.len() {
        let item = result[cursor];
        cursor += 1;
        if let Some(SymbolID::N(n)) = item.next_symbol(g) {
            for (id, _) in g.productions_of(n) {
                result.insert(Item {
                    production: id,
                    dot: 0,
                });
            }
        }
    }
    result
}

/// Advance the dot of every item expecting `symbol` by exactly one place,
/// then close the result. Returns an empty set when no item applies.
pub fn goto(g: &Grammar, items: &Set<Item>, symbol: SymbolID) -> Set<Item> {
    let mut moved = Set::default();
    for item in items {
        if item.next_symbol(g) == Some(symbol) {
            moved.insert(item.advanced());
        }
    }
    if moved.is_empty() {
        return moved;
    }
    closure(g, &moved)
}

/// A state of the canonical collection: its closed item set plus the
/// outgoing transitions, split into terminal shifts and nonterminal gotos.
#[derive(Debug)]
pub struct State {
    /// The items in sorted order; this sequence is the canonical key the
    /// state was interned under.
    pub items: Vec<Item>,
    pub shifts: Map<TerminalID, StateID>,
    pub gotos: Map<NonterminalID, StateID>,
}

impl State {
    pub fn transition(&self, symbol: SymbolID) -> Option<StateID> {
        match symbol {
            SymbolID::T(t) => self.shifts.get(&t).copied(),
            SymbolID::N(n) => self.gotos.get(&n).copied(),
        }
    }
}

#[derive(Debug)]
pub struct Automaton {
    pub states: Map<StateID, State>,
}

impl Automaton {
    pub fn state(&self, id: StateID) -> &State {
        &self.states[&id]
    }

    /// The console listing: total count, then one line per state with its
    /// dotted items.
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            writeln!(f, "Total States: {}", self.states.len())?;
            for (id, state) in &self.states {
                write!(f, "{} : [", id)?;
                for (i, item) in state.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item.display(g))?;
                }
                writeln!(f, "]")?;
            }
            Ok(())
        })
    }
}

/// Build the canonical collection with a worklist, interning each item set
/// by its sorted item sequence. State ids follow discovery order, and the
/// symbols leaving a state are visited in sorted order, so the numbering
/// depends only on the grammar.
pub fn automaton(g: &Grammar) -> Automaton {
    let mut states = Map::<StateID, State>::default();
    let mut interned = Map::<Vec<Item>, StateID>::default();
    let mut state_id = {
        let mut next = 0;
        move || {
            let id = StateID(next);
            next += 1;
            id
        }
    };

    let mut intern = |items: Vec<Item>,
                      states: &mut Map<StateID, State>,
                      pending: &mut VecDeque<StateID>| {
        match interned.get(&items) {
            Some(&id) => id,
            None => {
                let id = state_id();
                interned.insert(items.clone(), id);
                states.insert(
                    id,
                    State {
                        items,
                        shifts: Map::default(),
                        gotos: Map::default(),
                    },
                );
                pending.push_back(id);
                id
            }
        }
    };

    let mut pending = VecDeque::new();
    let mut seed = Set::default();
    seed.insert(Item {
        production: ProductionID::ACCEPT,
        dot: 0,
    });
    intern(sorted(closure(g, &seed)), &mut states, &mut pending);

    while let Some(current) = pending.pop_front() {
        let items: Set<Item> = states[&current].items.iter().copied().collect();

        let mut symbols: Vec<SymbolID> = items.iter().filter_map(|i| i.next_symbol(g)).collect();
        symbols.sort_unstable();
        symbols.dedup();

        let mut shifts = Map::default();
        let mut gotos = Map::default();
        for symbol in symbols {
            // Non-empty by construction: `symbol` came from an item of the
            // current state.
            let next_items = sorted(goto(g, &items, symbol));
            let next = intern(next_items, &mut states, &mut pending);
            match symbol {
                SymbolID::T(t) => {
                    shifts.insert(t, next);
                }
                SymbolID::N(n) => {
                    gotos.insert(n, next);
                }
            }
        }

        let state = &mut states[&current];
        state.shifts = shifts;
        state.gotos = gotos;
    }

    tracing::debug!("canonical collection holds {} states", states.len());
    Automaton { states }
}

fn sorted(items: Set<Item>) -> Vec<Item> {
    let mut items: Vec<Item> = items.into_iter().collect();
    items.sort_unstable();
    items
}
