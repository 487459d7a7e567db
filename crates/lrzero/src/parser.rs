//! Driving the runtime engine from a grammar and its tables.

use crate::grammar::{Grammar, NonterminalID, ProductionID, TerminalID};
use crate::lr0::StateID;
use crate::table::{Action, ParseTable};
use lrzero_runtime::definition::{ParseAction, ParserDef};
use lrzero_runtime::engine::{self, Engine, EngineError};

/// Adapter exposing the generated tables through the runtime's
/// [`ParserDef`] seam.
pub struct Tables<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl<'g> Tables<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        Self { grammar, table }
    }
}

impl ParserDef for Tables<'_> {
    type State = StateID;
    type Terminal = TerminalID;
    type Nonterminal = NonterminalID;
    type Production = ProductionID;

    fn initial_state(&self) -> StateID {
        StateID::INITIAL
    }

    fn action(
        &self,
        current: StateID,
        lookahead: TerminalID,
    ) -> Option<ParseAction<StateID, NonterminalID, ProductionID>> {
        let row = self.table.states.get(&current)?;
        Some(match *row.actions.get(&lookahead)? {
            Action::Shift(next) => ParseAction::Shift(next),
            Action::Reduce(production) => {
                let p = self.grammar.production(production);
                ParseAction::Reduce {
                    production,
                    left: p.left,
                    arity: p.right.len(),
                }
            }
            Action::Accept => ParseAction::Accept,
        })
    }

    fn goto(&self, current: StateID, left: NonterminalID) -> Option<StateID> {
        self.table.states.get(&current)?.gotos.get(&left).copied()
    }
}

pub type TraceEntry = engine::TraceEntry<StateID, TerminalID, NonterminalID, ProductionID>;
pub type Trace = Vec<TraceEntry>;

/// Outcome of a single parse.
#[derive(Debug)]
pub struct Parse {
    pub verdict: Verdict,
    pub trace: Trace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Why an input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("`{token}` is not a terminal of the grammar")]
    UnknownToken { token: String },

    #[error("no action for state {state} on the current lookahead")]
    NoAction {
        state: StateID,
        lookahead: TerminalID,
    },

    /// The tables are inconsistent: a reduction uncovered a state with no
    /// GOTO for the produced nonterminal.
    #[error("missing GOTO after a reduction in state {state}")]
    MissingGoto {
        state: StateID,
        left: NonterminalID,
    },
}

/// Table-driven parser for whitespace-tokenized input lines.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        Self { grammar, table }
    }

    /// Map an input line to terminals, appending the end marker.
    pub fn tokenize(&self, line: &str) -> Result<Vec<TerminalID>, Rejection> {
        let mut tokens = Vec::new();
        for token in line.split_whitespace() {
            match self.grammar.terminal_by_name(token) {
                Some(t) => tokens.push(t),
                None => {
                    return Err(Rejection::UnknownToken {
                        token: token.to_owned(),
                    })
                }
            }
        }
        tokens.push(TerminalID::EOI);
        Ok(tokens)
    }

    /// Tokenize `line` and drive the engine over it. A token outside the
    /// grammar rejects the input before the engine starts.
    pub fn parse_line(&self, line: &str) -> Result<Parse, EngineError> {
        let tokens = match self.tokenize(line) {
            Ok(tokens) => tokens,
            Err(rejection) => {
                return Ok(Parse {
                    verdict: Verdict::Rejected(rejection),
                    trace: Vec::new(),
                })
            }
        };
        self.parse(&tokens)
    }

    /// Drive the engine over a `$`-terminated token sequence.
    pub fn parse(&self, tokens: &[TerminalID]) -> Result<Parse, EngineError> {
        let def = Tables::new(self.grammar, self.table);
        let report = Engine::new(&def).run(tokens)?;

        let verdict = match report.outcome {
            engine::Outcome::Accepted => Verdict::Accepted,
            engine::Outcome::Rejected(engine::Reason::NoAction { state, lookahead }) => {
                Verdict::Rejected(Rejection::NoAction { state, lookahead })
            }
            engine::Outcome::Rejected(engine::Reason::MissingGoto { state, left }) => {
                Verdict::Rejected(Rejection::MissingGoto { state, left })
            }
        };
        Ok(Parse {
            verdict,
            trace: report.trace,
        })
    }
}
