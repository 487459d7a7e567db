//! The implementation of the shift-reduce parser engine.

use crate::definition::{ParseAction, ParserDef};

/// A grammar symbol sitting on the parser stack.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StackSymbol<TTerminal, TNonterminal> {
    T(TTerminal),
    N(TNonterminal),
}

/// One element of a stack snapshot. States and symbols alternate, starting
/// with the initial state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StackEntry<TState, TTerminal, TNonterminal> {
    State(TState),
    Symbol(StackSymbol<TTerminal, TNonterminal>),
}

/// What a trace entry records about its step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TraceStep<TState, TNonterminal, TProduction> {
    /// `ACTION[state][lookahead]` was a shift into `next`.
    Shift { state: TState, next: TState },

    /// A reduction by `production`; `state` is the state uncovered after
    /// popping the right-hand side.
    Reduce {
        state: TState,
        left: TNonterminal,
        production: TProduction,
    },

    /// `ACTION[state][lookahead]` accepted the input.
    Accept { state: TState },
}

/// One entry of the parse trace.
#[derive(Debug, Clone)]
pub struct TraceEntry<TState, TTerminal, TNonterminal, TProduction> {
    pub step: TraceStep<TState, TNonterminal, TProduction>,

    /// Input cursor at the time of the step.
    pub cursor: usize,

    pub lookahead: TTerminal,

    /// Stack snapshot taken before the step mutates the stack, except for
    /// reductions, which snapshot after the left-hand side is pushed and
    /// before its GOTO state lands.
    pub stack: Vec<StackEntry<TState, TTerminal, TNonterminal>>,
}

/// Why the engine stopped without accepting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reason<TState, TTerminal, TNonterminal> {
    /// `ACTION[state][lookahead]` is empty.
    NoAction { state: TState, lookahead: TTerminal },

    /// The tables are inconsistent: `GOTO[state][left]` is empty even
    /// though a reduction produced `left` there.
    MissingGoto { state: TState, left: TNonterminal },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome<TState, TTerminal, TNonterminal> {
    Accepted,
    Rejected(Reason<TState, TTerminal, TNonterminal>),
}

/// A finished parse: the terminal driver state plus the recorded trace.
#[derive(Debug)]
pub struct ParseReport<TState, TTerminal, TNonterminal, TProduction> {
    pub outcome: Outcome<TState, TTerminal, TNonterminal>,
    pub trace: Vec<TraceEntry<TState, TTerminal, TNonterminal, TProduction>>,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The token sequence ran out before the engine accepted or rejected.
    /// The caller must terminate the input with the end marker.
    #[error("input exhausted before the end marker was consumed")]
    UnexpectedEndOfInput,

    /// A reduction tried to pop more symbols than the stack holds.
    #[error("parser stack underflow during reduction")]
    StackUnderflow,
}

/// The shift-reduce driver. It owns the state/symbol stacks and records a
/// trace entry for every step it takes.
pub struct Engine<'d, D: ParserDef> {
    def: &'d D,
    states: Vec<D::State>,
    symbols: Vec<StackSymbol<D::Terminal, D::Nonterminal>>,
    cursor: usize,
    trace: Vec<TraceEntry<D::State, D::Terminal, D::Nonterminal, D::Production>>,
}

impl<'d, D: ParserDef> Engine<'d, D> {
    /// Create an engine using the specified parser definition.
    pub fn new(def: &'d D) -> Self {
        Self {
            def,
            states: vec![def.initial_state()],
            symbols: Vec::new(),
            cursor: 0,
            trace: Vec::new(),
        }
    }

    /// Drive the automaton over `tokens` until it accepts or rejects. The
    /// last token must be the end marker.
    pub fn run(
        mut self,
        tokens: &[D::Terminal],
    ) -> Result<ParseReport<D::State, D::Terminal, D::Nonterminal, D::Production>, EngineError>
    {
        loop {
            let current = *self.states.last().unwrap();
            let Some(&lookahead) = tokens.get(self.cursor) else {
                return Err(EngineError::UnexpectedEndOfInput);
            };

            let Some(action) = self.def.action(current, lookahead) else {
                return Ok(self.finish(Outcome::Rejected(Reason::NoAction {
                    state: current,
                    lookahead,
                })));
            };

            match action {
                ParseAction::Shift(next) => {
                    self.record(TraceStep::Shift { state: current, next }, lookahead);
                    self.symbols.push(StackSymbol::T(lookahead));
                    self.states.push(next);
                    self.cursor += 1;
                }

                ParseAction::Reduce {
                    production,
                    left,
                    arity,
                } => {
                    // Pop |rhs| symbols and their states, keeping at least
                    // the initial state.
                    let depth = self
                        .states
                        .len()
                        .checked_sub(arity)
                        .filter(|depth| *depth > 0)
                        .ok_or(EngineError::StackUnderflow)?;
                    self.states.truncate(depth);
                    self.symbols.truncate(depth - 1);

                    let uncovered = *self.states.last().unwrap();
                    self.symbols.push(StackSymbol::N(left));
                    self.record(
                        TraceStep::Reduce {
                            state: uncovered,
                            left,
                            production,
                        },
                        lookahead,
                    );

                    match self.def.goto(uncovered, left) {
                        Some(next) => self.states.push(next),
                        None => {
                            return Ok(self.finish(Outcome::Rejected(Reason::MissingGoto {
                                state: uncovered,
                                left,
                            })))
                        }
                    }
                }

                ParseAction::Accept => {
                    self.record(TraceStep::Accept { state: current }, lookahead);
                    return Ok(self.finish(Outcome::Accepted));
                }
            }
        }
    }

    fn record(
        &mut self,
        step: TraceStep<D::State, D::Nonterminal, D::Production>,
        lookahead: D::Terminal,
    ) {
        let stack = self.snapshot();
        self.trace.push(TraceEntry {
            step,
            cursor: self.cursor,
            lookahead,
            stack,
        });
    }

    fn snapshot(&self) -> Vec<StackEntry<D::State, D::Terminal, D::Nonterminal>> {
        let mut stack = Vec::with_capacity(self.states.len() + self.symbols.len());
        for (i, &state) in self.states.iter().enumerate() {
            stack.push(StackEntry::State(state));
            if let Some(&symbol) = self.symbols.get(i) {
                stack.push(StackEntry::Symbol(symbol));
            }
        }
        stack
    }

    fn finish(
        self,
        outcome: Outcome<D::State, D::Terminal, D::Nonterminal>,
    ) -> ParseReport<D::State, D::Terminal, D::Nonterminal, D::Production> {
        ParseReport {
            outcome,
            trace: self.trace,
        }
    }
}
