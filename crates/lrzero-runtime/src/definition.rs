//! Parser definition.

/// The trait for abstracting the generated ACTION/GOTO tables.
pub trait ParserDef {
    /// The number to identify a state of the automaton.
    type State: Copy;

    /// The number to identify a terminal symbol.
    type Terminal: Copy;

    /// The number to identify a nonterminal symbol.
    type Nonterminal: Copy;

    /// The number to identify a production rule.
    type Production: Copy;

    /// Return the state the engine starts in.
    fn initial_state(&self) -> Self::State;

    /// Look up `ACTION[current][lookahead]`.
    ///
    /// A `None` means the cell is empty and the input is rejected.
    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Terminal,
    ) -> Option<ParseAction<Self::State, Self::Nonterminal, Self::Production>>;

    /// Look up `GOTO[current][left]` after a reduction.
    fn goto(&self, current: Self::State, left: Self::Nonterminal) -> Option<Self::State>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseAction<TState, TNonterminal, TProduction> {
    /// Consume the lookahead and enter the given state.
    Shift(TState),

    /// Pop `arity` grammar symbols and replace them with `left`.
    Reduce {
        production: TProduction,
        left: TNonterminal,
        arity: usize,
    },

    /// The input is a sentence of the grammar.
    Accept,
}
