use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use lrzero::{
    automaton::Automaton,
    grammar::{Grammar, GrammarError},
    table::ParseTable,
    validate,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The bundled grammar to run through the pipeline.
    #[arg(long, value_enum, default_value_t = Sample::Arithmetic)]
    grammar: Sample,

    /// Print every automaton state with its items and transitions.
    #[arg(long)]
    states: bool,

    /// Print the rendered ACTION/GOTO table.
    #[arg(long)]
    table: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum Sample {
    /// The classic expression grammar (SLR(1), but not LR(0)).
    Arithmetic,
    /// Nested parentheses, a grammar that is LR(0).
    Nested,
    /// Two reductions competing for the same input.
    Clash,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let grammar = sample_grammar(args.grammar)
        .with_context(|| anyhow::anyhow!("errored during building the {:?} grammar", args.grammar))?
        .into_augmented();
    println!("{}", grammar);

    let automaton =
        Automaton::generate(&grammar).context("failed to generate the LR(0) automaton")?;
    if args.states {
        println!("{}", automaton);
    }

    let mut conflicted = 0;
    for diagnostic in validate::check(&automaton) {
        if diagnostic.conflict.is_some() {
            conflicted += 1;
            println!("{}", diagnostic.display(&automaton));
        }
    }
    if conflicted == 0 {
        println!(
            "the grammar is LR(0): {} states, no conflicts",
            automaton.states().len()
        );
    } else {
        println!(
            "{} of {} states are conflicted",
            conflicted,
            automaton.states().len()
        );
    }

    if args.table {
        let table = ParseTable::generate(&automaton);
        println!();
        println!("{}", table.display(&grammar));
    }

    Ok(())
}

fn sample_grammar(sample: Sample) -> Result<Grammar, GrammarError> {
    let mut g = Grammar::builder();
    match sample {
        Sample::Arithmetic => {
            g.rule("exp", ["exp", "+", "term"])
                .rule("exp", ["term"])
                .rule("term", ["term", "*", "factor"])
                .rule("term", ["factor"])
                .rule("factor", ["(", "exp", ")"])
                .rule("factor", ["number"]);
        }
        Sample::Nested => {
            g.rule("pair", ["(", "pair", ")"]).rule("pair", ["(", ")"]);
        }
        Sample::Clash => {
            g.rule("start", ["first"])
                .rule("start", ["second"])
                .rule("first", ["c"])
                .rule("second", ["c"]);
        }
    }
    g.build()
}
