//! Grammar model: interned symbols, productions, classification.

use crate::syntax::{self, RawProduction, SkippedLine, EOI_NAME, START_NAME};
use crate::types::Map;
use crate::util::display_fn;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalID(u16);

impl TerminalID {
    /// The end-of-input marker `$`.
    pub const EOI: Self = Self(0);

    const OFFSET: u16 = 1;

    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for TerminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::EOI => write!(f, "T#End"),
            _ => write!(f, "T#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonterminalID(u16);

impl NonterminalID {
    /// The synthetic start symbol `S'`.
    pub const START: Self = Self(0);

    const OFFSET: u16 = 1;

    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for NonterminalID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::START => write!(f, "N#Start"),
            _ => write!(f, "N#{:03}", self.0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

impl fmt::Debug for SymbolID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T(t) => write!(f, "{:?}", t),
            Self::N(n) => write!(f, "{:?}", n),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionID(u16);

impl ProductionID {
    /// The augmented production `S' -> S`, always index 0.
    pub const ACCEPT: Self = Self(0);

    const OFFSET: u16 = 1;

    pub const fn into_raw(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::ACCEPT => write!(f, "P#Accept"),
            _ => write!(f, "P#{:03}", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub left: NonterminalID,
    pub right: Vec<SymbolID>,
}

impl Production {
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "{} -> ", g.nonterminal_name(self.left))?;
            if self.right.is_empty() {
                f.write_str("ε")?;
            } else {
                for (i, symbol) in self.right.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(g.symbol_name(*symbol))?;
                }
            }
            Ok(())
        })
    }
}

/// An immutable grammar: the user productions plus the synthetic augmented
/// production, with every symbol classified and interned.
///
/// A symbol is a nonterminal iff it occurs as a left-hand side; every other
/// symbol occurring in a right-hand side is a terminal, and `$` is always a
/// terminal. Identifiers are assigned in sorted name order so that every
/// derived artifact is reproducible.
#[derive(Debug)]
pub struct Grammar {
    terminals: Map<TerminalID, String>,
    nonterminals: Map<NonterminalID, String>,
    productions: Map<ProductionID, Production>,
    start_symbol: NonterminalID,
}

/// A grammar together with the diagnostics its source produced.
#[derive(Debug)]
pub struct Loaded {
    pub grammar: Grammar,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("the grammar has no valid productions")]
    Empty { skipped: Vec<SkippedLine> },
}

impl Grammar {
    /// Parse a grammar source and intern it. Unparsable lines are skipped
    /// and reported through [`Loaded::skipped`]; a source without any valid
    /// production is an error.
    pub fn load(source: &str) -> Result<Loaded, GrammarError> {
        let (raw, skipped) = syntax::parse(source);
        if raw.is_empty() {
            return Err(GrammarError::Empty { skipped });
        }

        let grammar = Self::build(raw);
        tracing::debug!(
            "loaded grammar: {} terminals, {} nonterminals, {} productions",
            grammar.terminals.len(),
            grammar.nonterminals.len(),
            grammar.productions.len(),
        );
        Ok(Loaded { grammar, skipped })
    }

    fn build(raw: Vec<RawProduction>) -> Self {
        let mut nonterminal_names: Vec<&str> = raw.iter().map(|p| p.left.as_str()).collect();
        nonterminal_names.sort_unstable();
        nonterminal_names.dedup();

        let mut terminal_names: Vec<&str> = raw
            .iter()
            .flat_map(|p| p.right.iter().map(String::as_str))
            .filter(|token| *token != EOI_NAME && nonterminal_names.binary_search(token).is_err())
            .collect();
        terminal_names.sort_unstable();
        terminal_names.dedup();

        let mut terminals = Map::default();
        let mut terminal_ids = Map::<&str, TerminalID>::default();
        terminals.insert(TerminalID::EOI, EOI_NAME.to_owned());
        terminal_ids.insert(EOI_NAME, TerminalID::EOI);
        for (i, &name) in terminal_names.iter().enumerate() {
            let id = TerminalID(TerminalID::OFFSET + i as u16);
            terminals.insert(id, name.to_owned());
            terminal_ids.insert(name, id);
        }

        let mut nonterminals = Map::default();
        let mut nonterminal_ids = Map::<&str, NonterminalID>::default();
        nonterminals.insert(NonterminalID::START, START_NAME.to_owned());
        for (i, &name) in nonterminal_names.iter().enumerate() {
            let id = NonterminalID(NonterminalID::OFFSET + i as u16);
            nonterminals.insert(id, name.to_owned());
            nonterminal_ids.insert(name, id);
        }

        let intern = |token: &str| match nonterminal_ids.get(token) {
            Some(&n) => SymbolID::N(n),
            None => SymbolID::T(terminal_ids[token]),
        };

        // The start symbol is the left-hand side of the first production in
        // the source.
        let start_symbol = nonterminal_ids[raw[0].left.as_str()];

        let mut productions = Map::default();
        productions.insert(
            ProductionID::ACCEPT,
            Production {
                left: NonterminalID::START,
                right: vec![SymbolID::N(start_symbol)],
            },
        );
        for (i, p) in raw.iter().enumerate() {
            productions.insert(
                ProductionID(ProductionID::OFFSET + i as u16),
                Production {
                    left: nonterminal_ids[p.left.as_str()],
                    right: p.right.iter().map(|token| intern(token)).collect(),
                },
            );
        }

        Self {
            terminals,
            nonterminals,
            productions,
            start_symbol,
        }
    }

    /// All terminals, the end marker first and the rest in sorted name
    /// order.
    pub fn terminals(&self) -> impl Iterator<Item = (TerminalID, &str)> + '_ {
        self.terminals.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// All nonterminals, the synthetic start symbol first and the rest in
    /// sorted name order.
    pub fn nonterminals(&self) -> impl Iterator<Item = (NonterminalID, &str)> + '_ {
        self.nonterminals
            .iter()
            .map(|(id, name)| (*id, name.as_str()))
    }

    /// All productions in index order, the augmented one first.
    pub fn productions(&self) -> impl Iterator<Item = (ProductionID, &Production)> + '_ {
        self.productions.iter().map(|(id, p)| (*id, p))
    }

    /// The productions whose left-hand side is `left`.
    pub fn productions_of(
        &self,
        left: NonterminalID,
    ) -> impl Iterator<Item = (ProductionID, &Production)> + '_ {
        self.productions().filter(move |(_, p)| p.left == left)
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[&id]
    }

    pub fn terminal_name(&self, id: TerminalID) -> &str {
        &self.terminals[&id]
    }

    pub fn nonterminal_name(&self, id: NonterminalID) -> &str {
        &self.nonterminals[&id]
    }

    pub fn symbol_name(&self, id: SymbolID) -> &str {
        match id {
            SymbolID::T(t) => self.terminal_name(t),
            SymbolID::N(n) => self.nonterminal_name(n),
        }
    }

    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalID> {
        self.terminals
            .iter()
            .find_map(|(id, n)| (n.as_str() == name).then_some(*id))
    }

    pub fn start_symbol(&self) -> NonterminalID {
        self.start_symbol
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "terminals: ")?;
        for (i, (_, name)) in self.terminals().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        write!(f, "\nnonterminals: ")?;
        for (i, (_, name)) in self.nonterminals().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        writeln!(
            f,
            "\nstart_symbol: {}",
            self.nonterminal_name(self.start_symbol)
        )?;
        writeln!(f, "productions:")?;
        for (id, p) in self.productions() {
            writeln!(f, "  [{:02}] {}", id.into_raw(), p.display(self))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(source: &str) -> Grammar {
        Grammar::load(source).unwrap().grammar
    }

    #[test]
    fn classifies_symbols_by_left_hand_sides() {
        let g = load("S -> A a\nA -> b\n");

        let terminals: Vec<&str> = g.terminals().map(|(_, name)| name).collect();
        let nonterminals: Vec<&str> = g.nonterminals().map(|(_, name)| name).collect();

        assert_eq!(terminals, vec!["$", "a", "b"]);
        assert_eq!(nonterminals, vec!["S'", "A", "S"]);
        assert!(terminals.iter().all(|t| !nonterminals.contains(t)));
    }

    #[test]
    fn augments_with_the_first_left_hand_side() {
        let g = load("E -> E + T\nT -> id\n");

        let accept = g.production(ProductionID::ACCEPT);
        assert_eq!(accept.left, NonterminalID::START);
        assert_eq!(accept.right, vec![SymbolID::N(g.start_symbol())]);
        assert_eq!(g.nonterminal_name(g.start_symbol()), "E");
    }

    #[test]
    fn production_indices_follow_source_order() {
        let g = load("S -> a\nS -> b\n");

        let rendered: Vec<String> = g
            .productions()
            .map(|(_, p)| p.display(&g).to_string())
            .collect();
        assert_eq!(rendered, vec!["S' -> S", "S -> a", "S -> b"]);
    }

    #[test]
    fn epsilon_production_has_an_empty_right_hand_side() {
        let g = load("S -> ( S )\nS ->\n");

        let (_, epsilon) = g
            .productions()
            .find(|(_, p)| p.right.is_empty())
            .expect("epsilon production");
        assert_eq!(epsilon.display(&g).to_string(), "S -> ε");
    }

    #[test]
    fn end_marker_is_a_terminal_even_when_unused() {
        let g = load("S -> a\n");
        assert_eq!(g.terminal_by_name("$"), Some(TerminalID::EOI));
    }

    #[test]
    fn empty_source_is_fatal() {
        assert!(matches!(
            Grammar::load(""),
            Err(GrammarError::Empty { .. })
        ));
        let Err(GrammarError::Empty { skipped }) = Grammar::load("nonsense\n") else {
            panic!("expected an empty-grammar error");
        };
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn display_is_stable() {
        let g = load("S -> a S\nS -> a\n");
        let rendered = g.to_string();
        assert!(rendered.contains("terminals: $, a"));
        assert!(rendered.contains("start_symbol: S"));
        assert!(rendered.contains("[01] S -> a S"));
    }
}
