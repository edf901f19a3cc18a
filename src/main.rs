// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

use bigraph_match::{
    solve_with_timeout, Bigraph, BigraphDocument, EnumeratedSymmetries, MatchOracle, NamedPipeOracle,
    RestartPolicy, RuleToggles, SolutionSink, SolveHooks, SolveResult, SolverParams, SymmetryOracle,
    Timeout, ValueOrdering,
};

#[derive(Parser, Debug)]
#[command(name = "bigraph-match")]
#[command(about = "Find or count embeddings of a pattern bigraph into a target bigraph")]
struct Cli {
    /// Pattern bigraph, as a JSON document
    pattern: PathBuf,
    /// Target bigraph, as a JSON document
    target: PathBuf,

    /// Give up after this many seconds (0 stops at the first node)
    #[arg(long)]
    timeout: Option<u64>,
    /// Use every core, with triggered restarts, delayed thread creation and timed restarts
    #[arg(long)]
    parallel: bool,
    #[arg(long)]
    count_solutions: bool,
    /// Print each mapping as it is found (implies --count-solutions)
    #[arg(long)]
    print_all_solutions: bool,

    /// luby, geometric, timed or none
    #[arg(long)]
    restarts: Option<String>,
    #[arg(long)]
    geometric_multiplier: Option<f64>,
    #[arg(long)]
    geometric_constant: Option<f64>,
    /// Milliseconds between timed restarts
    #[arg(long)]
    restart_interval: Option<u64>,
    /// Backtracks required before a timed restart
    #[arg(long)]
    restart_minimum: Option<u64>,
    #[arg(long)]
    luby_constant: Option<u64>,
    /// biased, degree, antidegree or random
    #[arg(long, default_value = "biased")]
    value_ordering: String,

    /// Find pattern automorphisms and break them
    #[arg(long)]
    pattern_symmetries: bool,
    #[arg(long)]
    no_clique_detection: bool,
    #[arg(long)]
    no_isolated_vertex_removal: bool,
    #[arg(long)]
    no_supplementals: bool,
    #[arg(long)]
    no_nds: bool,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long)]
    triggered_restarts: bool,
    #[arg(long)]
    delay_thread_creation: bool,

    /// Require image(v) < image(w); repeatable
    #[arg(long = "pattern-less-than", value_name = "V<W")]
    pattern_less_than: Vec<String>,
    #[arg(long)]
    pattern_automorphism_group_size: Option<String>,

    /// Named pipe carrying candidate mappings to the oracle
    #[arg(long, requires = "receive_from_lackey")]
    send_to_lackey: Option<PathBuf>,
    /// Named pipe carrying the oracle's verdicts
    #[arg(long, requires = "send_to_lackey")]
    receive_from_lackey: Option<PathBuf>,

    /// Allow extra structure between images
    #[arg(long)]
    not_induced: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Print the result as one JSON object
    #[arg(long)]
    json: bool,
    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let pattern = load(&cli.pattern, "pattern")?;
    let target = load(&cli.target, "target")?;
    let params = params(&cli)?;
    tracing::debug!(?params, "parameters");

    let oracle = match (&cli.send_to_lackey, &cli.receive_from_lackey) {
        (Some(send), Some(receive)) => Some(NamedPipeOracle::open(send, receive, &pattern, &target)?),
        _ => None,
    };
    let symmetries = EnumeratedSymmetries::default();
    let printed = Mutex::new(Vec::new());
    let print_all = |mapping: &[(usize, usize)]| {
        if cli.json {
            if let Ok(mut printed) = printed.lock() {
                printed.push(mapping.to_vec());
            }
        } else {
            println!("mapping = {}", describe(mapping, &pattern, &target));
        }
        true
    };
    let hooks = SolveHooks {
        sink: cli
            .print_all_solutions
            .then_some(&print_all as &dyn SolutionSink),
        oracle: oracle.as_ref().map(|o| o as &dyn MatchOracle),
        symmetry: cli
            .pattern_symmetries
            .then_some(&symmetries as &dyn SymmetryOracle),
    };
    let timeout = match cli.timeout {
        None => Timeout::unbounded(),
        Some(0) => Timeout::expired(),
        Some(seconds) => Timeout::new(Duration::from_secs(seconds)),
    };

    let started = Instant::now();
    let result = solve_with_timeout(&pattern, &target, &params, &hooks, timeout)?;
    let runtime = started.elapsed();

    let counting = params.count_solutions || cli.print_all_solutions;
    if cli.json {
        let solutions = printed.into_inner().unwrap_or_default();
        report_json(&result, &params, &pattern, &target, runtime, solutions)?;
    } else {
        report_text(&result, counting, &pattern, &target, runtime);
    }
    Ok(())
}

fn load(path: &Path, role: &str) -> Result<Bigraph> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {} {}", role, path.display()))?;
    Ok(BigraphDocument::parse(&text, role)?)
}

fn params(cli: &Cli) -> Result<SolverParams> {
    Ok(SolverParams {
        induced: !cli.not_induced,
        count_solutions: cli.count_solutions || cli.print_all_solutions,
        restarts: restart_policy(cli)?,
        value_ordering: ValueOrdering::from_name(&cli.value_ordering)?,
        n_threads: cli.threads.unwrap_or(if cli.parallel { 0 } else { 1 }),
        triggered_restarts: cli.triggered_restarts || cli.parallel,
        delay_thread_creation: cli.delay_thread_creation || cli.parallel,
        pattern_less_constraints: cli.pattern_less_than.clone(),
        pattern_automorphism_group_size: cli.pattern_automorphism_group_size.clone(),
        rules: RuleToggles {
            no_clique_detection: cli.no_clique_detection,
            no_isolated_vertex_removal: cli.no_isolated_vertex_removal,
            no_supplementals: cli.no_supplementals,
            no_nds: cli.no_nds,
        },
        timeout: Duration::from_secs(cli.timeout.unwrap_or(0)),
        seed: cli.seed,
    })
}

/// The named policy with any overridden parameters; `None` leaves the choice to the solver.
fn restart_policy(cli: &Cli) -> Result<Option<RestartPolicy>> {
    let name = match (&cli.restarts, cli.parallel) {
        (Some(name), _) => name.as_str(),
        (None, true) => "timed",
        (None, false) => return Ok(None),
    };
    let mut policy = RestartPolicy::from_name(name)?;
    match &mut policy {
        RestartPolicy::Luby { multiplier } => {
            if let Some(c) = cli.luby_constant {
                *multiplier = c;
            }
        }
        RestartPolicy::Geometric {
            initial_value,
            multiplier,
        } => {
            if let Some(c) = cli.geometric_constant {
                *initial_value = c;
            }
            if let Some(m) = cli.geometric_multiplier {
                *multiplier = m;
            }
        }
        RestartPolicy::Timed {
            interval,
            minimum_backtracks,
        } => {
            if let Some(ms) = cli.restart_interval {
                *interval = Duration::from_millis(ms);
            }
            if let Some(n) = cli.restart_minimum {
                *minimum_backtracks = n;
            }
        }
        RestartPolicy::NoRestarts => {}
    }
    Ok(Some(policy))
}

fn describe(mapping: &[(usize, usize)], pattern: &Bigraph, target: &Bigraph) -> String {
    mapping
        .iter()
        .map(|&(p, t)| format!("({} -> {})", pattern.name(p), target.name(t)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn status(result: &SolveResult) -> &'static str {
    if result.aborted {
        "aborted"
    } else if result.found {
        "true"
    } else {
        "false"
    }
}

fn report_text(result: &SolveResult, counting: bool, pattern: &Bigraph, target: &Bigraph, runtime: Duration) {
    println!("status = {}", status(result));
    if counting {
        println!("solution_count = {}", result.solution_count);
    }
    println!("nodes = {}", result.nodes);
    println!("propagations = {}", result.propagations);
    if !result.mapping.is_empty() {
        println!("mapping = {}", describe(&result.mapping, pattern, target));
    }
    println!("runtime = {}", runtime.as_millis());
    for line in &result.extra_stats {
        println!("{}", line);
    }
}

fn report_json(
    result: &SolveResult,
    params: &SolverParams,
    pattern: &Bigraph,
    target: &Bigraph,
    runtime: Duration,
    solutions: Vec<Vec<(usize, usize)>>,
) -> Result<()> {
    let names = |mapping: &[(usize, usize)]| -> Vec<(String, String)> {
        mapping
            .iter()
            .map(|&(p, t)| (pattern.name(p).to_string(), target.name(t).to_string()))
            .collect()
    };
    let report = serde_json::json!({
        "status": status(result),
        "result": result,
        "mapping_names": names(&result.mapping),
        "solutions": solutions.iter().map(|m| names(m)).collect::<Vec<_>>(),
        "runtime_ms": runtime.as_millis() as u64,
        "params": params,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
