//! flutesat command-line interface.

use anyhow::{Context, Result};
use clap::Parser;
use flutesat::{parse_problem, Interner, ProofResult, Prover, ProverConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "flutesat")]
#[command(about = "Saturation prover with a fluted fragment decision procedure", long_about = None)]
struct Cli {
    /// TPTP problem file (fof and cnf units)
    input: PathBuf,

    /// Enable the fluted pipeline: classification gate, definitional
    /// preprocessing, separation, and fluted resolution. Aborts with a
    /// diagnostic when the problem is outside the fragment.
    #[arg(long)]
    fluted: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Timeout in seconds
    #[arg(short, long, default_value = "60")]
    timeout: u64,

    /// Stop after this many stored clauses (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_clauses: usize,

    /// Stop after this many activations (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_iterations: usize,

    /// Passive-container weight limit for generated clauses
    #[arg(long)]
    weight_limit: Option<usize>,

    /// Passive-container age limit for generated clauses
    #[arg(long)]
    age_limit: Option<usize>,

    /// Probability of selecting the given clause by age instead of weight
    #[arg(long, default_value = "0.5")]
    age_probability: f64,

    /// Disable the ordering aftercheck on resolvents
    #[arg(long)]
    no_aftercheck: bool,

    /// Dump statistics as JSON after the run
    #[arg(long)]
    stats_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let mut interner = Interner::new();
    let problem = parse_problem(&content, &mut interner).map_err(anyhow::Error::msg)?;

    let config = ProverConfig {
        fluted_mode: cli.fluted,
        ordering_aftercheck: !cli.no_aftercheck,
        max_clauses: cli.max_clauses,
        max_iterations: cli.max_iterations,
        timeout: Duration::from_secs(cli.timeout),
        age_limit: cli.age_limit,
        weight_limit: cli.weight_limit,
        age_probability: cli.age_probability,
        ..ProverConfig::default()
    };

    let mut prover = Prover::from_problem(problem, config, interner)?;
    let result = prover.prove();

    match result {
        ProofResult::Proof { empty_clause_idx } => {
            println!("% SZS status Unsatisfiable");
            println!("% SZS output start Refutation");
            for step in prover.extract_proof(empty_clause_idx) {
                let premises = step
                    .premises
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                println!(
                    "cnf(c{}, plain, ({})). % {}{}{}",
                    step.clause_idx,
                    step.conclusion.display(&prover.env.interner),
                    step.rule_name,
                    if premises.is_empty() { "" } else { " " },
                    premises
                );
            }
            println!("% SZS output end Refutation");
        }
        ProofResult::Saturated => println!("% SZS status Satisfiable"),
        ProofResult::ResourceLimit => println!("% SZS status ResourceOut"),
    }

    let stats = &prover.env.statistics;
    if cli.stats_json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        eprintln!(
            "% clauses: {}, resolutions: {}, separations: {}, definitions: {}, tautologies deleted: {}",
            prover.state.clauses.len(),
            stats.resolutions,
            stats.separations,
            stats.definitions_introduced,
            stats.tautologies_deleted
        );
    }

    Ok(())
}
