//! Rendering of the parse table and parse traces.

use crate::grammar::{Grammar, NonterminalID, TerminalID};
use crate::lr0::StateID;
use crate::parser::Trace;
use crate::table::ParseTable;
use lrzero_runtime::engine::{StackEntry, StackSymbol, TraceStep};
use tabled::{builder::Builder, Table, Tabled};

/// Render the ACTION/GOTO grid: one row per state, terminal columns first,
/// then nonterminal columns, both sorted by symbol name. The synthetic
/// start symbol has no GOTO column; nothing ever transitions on it.
pub fn parse_table(g: &Grammar, table: &ParseTable) -> Table {
    let mut terminals: Vec<(TerminalID, &str)> = g.terminals().collect();
    terminals.sort_by_key(|(_, name)| *name);

    let mut nonterminals: Vec<(NonterminalID, &str)> = g
        .nonterminals()
        .filter(|(id, _)| *id != NonterminalID::START)
        .collect();
    nonterminals.sort_by_key(|(_, name)| *name);

    let mut builder = Builder::default();

    let mut header = vec!["State".to_owned()];
    header.extend(terminals.iter().map(|(_, name)| (*name).to_owned()));
    header.extend(nonterminals.iter().map(|(_, name)| (*name).to_owned()));
    builder.push_record(header);

    for (state, row) in &table.states {
        let mut record = vec![state.to_string()];
        for (t, _) in &terminals {
            record.push(
                row.actions
                    .get(t)
                    .map(|action| action.to_string())
                    .unwrap_or_default(),
            );
        }
        for (n, _) in &nonterminals {
            record.push(
                row.gotos
                    .get(n)
                    .map(|next| next.to_string())
                    .unwrap_or_default(),
            );
        }
        builder.push_record(record);
    }

    builder.build()
}

/// One rendered trace row.
#[derive(Debug, Tabled)]
pub struct TraceRow {
    #[tabled(rename = "Process")]
    pub process: String,

    /// The input cursor at the time of the step.
    #[tabled(rename = "LookAhead")]
    pub lookahead: String,

    #[tabled(rename = "Symbol")]
    pub symbol: String,

    #[tabled(rename = "Stack")]
    pub stack: String,
}

pub fn trace_rows(g: &Grammar, trace: &Trace) -> Vec<TraceRow> {
    trace
        .iter()
        .map(|entry| {
            let process = match entry.step {
                TraceStep::Shift { state, next } => format!(
                    "Action({}, {}) = S{}",
                    state,
                    g.terminal_name(entry.lookahead),
                    next,
                ),
                TraceStep::Reduce {
                    state,
                    left,
                    production,
                } => format!(
                    "Action({}, {}) = r{}",
                    state,
                    g.nonterminal_name(left),
                    production.into_raw(),
                ),
                TraceStep::Accept { state } => format!(
                    "Action({}, {}) = Accept",
                    state,
                    g.terminal_name(entry.lookahead),
                ),
            };
            TraceRow {
                process,
                lookahead: entry.cursor.to_string(),
                symbol: g.terminal_name(entry.lookahead).to_owned(),
                stack: render_stack(g, &entry.stack),
            }
        })
        .collect()
}

pub fn trace_table(g: &Grammar, trace: &Trace) -> Table {
    Table::new(trace_rows(g, trace))
}

fn render_stack(g: &Grammar, stack: &[StackEntry<StateID, TerminalID, NonterminalID>]) -> String {
    let mut out = String::new();
    for (i, entry) in stack.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match entry {
            StackEntry::State(state) => out.push_str(&state.to_string()),
            StackEntry::Symbol(StackSymbol::T(t)) => out.push_str(g.terminal_name(*t)),
            StackEntry::Symbol(StackSymbol::N(n)) => out.push_str(g.nonterminal_name(*n)),
        }
    }
    out
}
