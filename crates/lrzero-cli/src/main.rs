use anyhow::Context as _;
use clap::Parser as _;
use lrzero::grammar::{Grammar, GrammarError};
use lrzero::parser::{Parser, Verdict};
use lrzero::table::{self, Config, TableError};
use lrzero::{lr0, report};
use std::io::{self, Write as _};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grammar identifier; `<grammar-dir>/<id>.txt` is loaded. Prompted
    /// for when absent.
    grammar: Option<u32>,

    /// Input line to parse instead of prompting for one.
    #[arg(long)]
    input: Option<String>,

    /// Directory holding grammar files.
    #[arg(long, default_value = "grammar")]
    grammar_dir: PathBuf,

    /// Directory receiving the traces of accepted inputs.
    #[arg(long, default_value = "parsable_strings")]
    out_dir: PathBuf,

    /// Fail on ACTION conflicts instead of resolving them.
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    println!("LR(0) Parser Generator & Parser\n");

    let grammar_id = match args.grammar {
        Some(id) => id,
        None => prompt("Enter grammar number: ")?
            .parse()
            .context("the grammar id must be a number")?,
    };

    let grammar_path = args.grammar_dir.join(format!("{grammar_id}.txt"));
    let source = fs::read_to_string(&grammar_path)
        .with_context(|| format!("cannot open grammar file: {}", grammar_path.display()))?;

    let loaded = match Grammar::load(&source) {
        Ok(loaded) => loaded,
        Err(GrammarError::Empty { skipped }) => {
            for line in &skipped {
                eprintln!("{line}");
            }
            anyhow::bail!("grammar file {} holds no valid production", grammar_path.display());
        }
    };
    for line in &loaded.skipped {
        eprintln!("{line}");
    }
    let grammar = loaded.grammar;
    tracing::debug!("loaded grammar:\n{grammar}");

    let automaton = lr0::automaton(&grammar);
    println!("---------------------------------------------------------------");
    print!("{}", automaton.display(&grammar));
    println!("---------------------------------------------------------------");

    let table = match table::generate(&grammar, &automaton, Config { strict: args.strict }) {
        Ok(table) => table,
        Err(TableError::Conflicts { conflicts }) => {
            for conflict in &conflicts {
                eprintln!("{}", conflict.display(&grammar));
            }
            anyhow::bail!("refusing to build the table: {} conflict(s)", conflicts.len());
        }
    };
    for conflict in &table.conflicts {
        eprintln!("{}", conflict.display(&grammar));
    }

    println!("\nParsing Table:\n");
    println!("{}", report::parse_table(&grammar, &table));

    let input_line = match args.input {
        Some(line) => line,
        None => prompt("\nEnter the string to be parsed (tokens separated by spaces): ")?,
    };

    let parser = Parser::new(&grammar, &table);
    let parse = parser.parse_line(&input_line)?;

    match &parse.verdict {
        Verdict::Accepted => {
            let rendered = report::trace_table(&grammar, &parse.trace).to_string();
            let trace_dir = args.out_dir.join(grammar_id.to_string());
            fs::create_dir_all(&trace_dir)
                .with_context(|| format!("creating {}", trace_dir.display()))?;
            let trace_file = trace_dir.join(format!("{}.txt", compressed_name(&input_line)));
            fs::write(&trace_file, rendered)
                .with_context(|| format!("writing {}", trace_file.display()))?;
            println!(
                "The string \"{input_line}\" is parsable! Saved in {}",
                trace_file.display()
            );
        }
        Verdict::Rejected(rejection) => {
            tracing::debug!("rejected: {rejection}");
            println!("The string \"{input_line}\" is not parsable!");
        }
    }

    Ok(())
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    io::stdout().flush().context("flushing the prompt")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("reading standard input")?;
    Ok(line.trim().to_owned())
}

/// Distinct non-whitespace characters of the input in first-occurrence
/// order, each followed by its frequency.
fn compressed_name(input: &str) -> String {
    let mut freq: Vec<(char, usize)> = Vec::new();
    for c in input.chars().filter(|c| !c.is_whitespace()) {
        match freq.iter_mut().find(|(seen, _)| *seen == c) {
            Some((_, count)) => *count += 1,
            None => freq.push((c, 1)),
        }
    }
    freq.into_iter()
        .map(|(c, count)| format!("{c}{count}"))
        .collect()
}
