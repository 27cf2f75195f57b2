use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use krepis_banker::adapters::{JsonLinesObserver, TracingObserver};
use krepis_banker::domain::{
    Continuation, CycleObserver, CycleReport, DeadlockDetector, ProcessId, RequestOutcome,
    Resolution, ResolutionAction, Scenario, SimulationBuilder, SimulationConfig, StateSnapshot,
    Verdict,
};
use krepis_banker::infrastructure::{load_config, load_scenario, save_scenario};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Krepis Banker CLI
/// Deadlock-aware resource allocation simulator
#[derive(Parser)]
#[command(name = "krepis-banker", version)]
#[command(about = "Banker's-algorithm resource simulator", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot safety check of a scenario
    Check {
        #[command(flatten)]
        source: ScenarioSource,
    },
    /// Run the cycle simulation
    Run(RunArgs),
    /// Write the classic scenario as a starting template
    Template {
        /// Destination file
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ScenarioSource {
    /// Scenario JSON file
    #[arg(short, long)]
    scenario: Option<PathBuf>,
    /// Use the built-in five-process example
    #[arg(long)]
    classic: bool,
}

impl ScenarioSource {
    fn load(&self) -> Result<Scenario> {
        match &self.scenario {
            Some(path) => load_scenario(path)
                .with_context(|| format!("loading scenario {}", path.display())),
            None => Ok(Scenario::classic()),
        }
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: ScenarioSource,
    /// Number of cycles
    #[arg(short = 'n', long, default_value_t = 10)]
    cycles: u64,
    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
    /// Requests per cycle upper bound (overrides the config file)
    #[arg(short = 'k', long)]
    max_requests: Option<usize>,
    /// Configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the run summary as JSON instead of per-cycle tables
    #[arg(long)]
    json: bool,
    /// Ask before every cycle
    #[arg(short, long)]
    interactive: bool,
    /// Append every cycle report as a JSON line to this file
    #[arg(long)]
    trace: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("⚡ Krepis Banker v{}", krepis_banker::VERSION);

    match cli.command {
        Commands::Check { source } => check(&source),
        Commands::Run(args) => run(args),
        Commands::Template { out } => {
            save_scenario(&out, &Scenario::classic())
                .with_context(|| format!("writing {}", out.display()))?;
            info!("📝 Template written to {}", out.display());
            Ok(())
        }
    }
}

fn check(source: &ScenarioSource) -> Result<()> {
    let scenario = source.load()?;
    let state = scenario.into_state(&SimulationConfig::default())?;

    info!("🔍 Checking {} processes x {} resource types", state.num_processes(), state.num_resources());
    print_state(&state.snapshot());

    let detection = DeadlockDetector::detect(&state);
    match detection.verdict {
        Verdict::Safe => println!("SAFE  sequence: {}", join(&detection.safe_sequence)),
        Verdict::Deadlocked => println!("DEADLOCKED  blocked: {}", join(&detection.deadlocked)),
    }
    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(k) = args.max_requests {
        config.max_requests_per_cycle = k;
    }
    if args.interactive && args.json {
        bail!("--interactive and --json cannot be combined");
    }

    let scenario = args.source.load()?;
    let mut engine = SimulationBuilder::new().config(config).build(scenario)?;

    info!(
        "🎯 Running {} cycles (seed {:#x}, K = {})",
        args.cycles,
        engine.config().seed,
        engine.config().max_requests_per_cycle
    );

    let mut console = ConsoleObserver { enabled: !args.json };
    let mut tracer = TracingObserver;
    let mut trace_file = match &args.trace {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Some(JsonLinesObserver::new(BufWriter::new(file)))
        }
        None => None,
    };

    let mut observers: Vec<&mut dyn CycleObserver> = vec![&mut console, &mut tracer];
    if let Some(observer) = trace_file.as_mut() {
        observers.push(observer);
    }
    let mut fanout = Fanout(observers);

    let interactive = args.interactive;
    let summary = engine.run_observed(args.cycles, &mut fanout, |_| {
        if interactive {
            prompt_continue()
        } else {
            Continuation::Continue
        }
    });

    if let Some(observer) = trace_file {
        observer.finish().context("writing cycle trace")?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("=== Summary after {} cycles ===", summary.cycles);
        println!(
            "granted {}  denied {}  rolled back {}  discarded {}",
            summary.granted, summary.denied, summary.rolled_back, summary.discarded
        );
        println!(
            "deadlocked cycles {}  preempted units {}  terminations {}  delays {}",
            summary.deadlocked_cycles, summary.preempted_units, summary.terminations, summary.delays
        );
    }

    info!("✅ Conservation holds: {}", engine.state().is_conserved());
    Ok(())
}

/// Broadcasts each report to several observers
struct Fanout<'a>(Vec<&'a mut dyn CycleObserver>);

impl CycleObserver for Fanout<'_> {
    fn on_cycle(&mut self, report: &CycleReport) {
        for observer in self.0.iter_mut() {
            observer.on_cycle(report);
        }
    }
}

/// Prints per-cycle tables to stdout
struct ConsoleObserver {
    enabled: bool,
}

impl CycleObserver for ConsoleObserver {
    fn on_cycle(&mut self, report: &CycleReport) {
        if !self.enabled {
            return;
        }

        println!();
        println!("=== Cycle {} ===", report.cycle);
        if report.deferred {
            println!("requests deferred");
        }
        for record in &report.requests {
            println!("  {} requests {:?}: {}", record.process, record.request, outcome_label(&record.outcome));
        }

        print_state(&report.state);

        match report.detection.verdict {
            Verdict::Safe => println!("SAFE  sequence: {}", join(&report.detection.safe_sequence)),
            Verdict::Deadlocked => println!("DEADLOCKED  blocked: {}", join(&report.detection.deadlocked)),
        }

        let risk = &report.risk;
        println!(
            "risk {:.3} [{}]  demand {:.3}  pressure {:.3}  concurrency {:.3}",
            risk.probability, risk.level, risk.demand_ratio, risk.pressure_ratio, risk.concurrency
        );

        match &report.resolution {
            Resolution::NotNeeded => {}
            Resolution::NoVictim { trigger } => println!("resolution ({:?}): no victim", trigger),
            Resolution::Applied { trigger, actions, safe_after } => {
                for action in actions {
                    match action {
                        ResolutionAction::Preempt { victim, units } => {
                            println!("resolution ({:?}): preempted {} unit(s) from {}", trigger, units, victim)
                        }
                        ResolutionAction::Terminate { victim, released } => {
                            println!("resolution ({:?}): terminated {}, released {:?}", trigger, victim, released)
                        }
                        ResolutionAction::Delay => println!("resolution ({:?}): delaying new requests", trigger),
                    }
                }
                println!("safe after resolution: {}", safe_after);
            }
        }
    }
}

fn outcome_label(outcome: &RequestOutcome) -> String {
    match outcome {
        RequestOutcome::Granted => "granted".to_string(),
        RequestOutcome::RolledBack => "rolled back (unsafe)".to_string(),
        RequestOutcome::Discarded => "discarded".to_string(),
        RequestOutcome::Denied { resource, requested, available } => {
            format!("denied ({} wants {}, {} free)", resource, requested, available)
        }
    }
}

fn print_state(snapshot: &StateSnapshot) {
    println!("{:<6}{:<24}{:<24}{:<24}", "", "Allocation", "Maximum", "Need");
    for (i, alloc) in snapshot.allocation.iter().enumerate() {
        let pid = ProcessId(i);
        let marker = if snapshot.terminated.contains(&pid) { " x" } else { "" };
        println!(
            "{:<6}{:<24}{:<24}{:<24}{}",
            pid.to_string(),
            row(alloc),
            row(&snapshot.maximum[i]),
            row(&snapshot.need[i]),
            marker
        );
    }
    println!("Available: {}", row(&snapshot.available));
}

fn row(values: &[u32]) -> String {
    values
        .iter()
        .map(|v| format!("{:>3}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join(pids: &[ProcessId]) -> String {
    if pids.is_empty() {
        return "-".to_string();
    }
    pids.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
}

fn prompt_continue() -> Continuation {
    print!("continue? [Y/q] ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => Continuation::Stop,
        Ok(_) if line.trim().eq_ignore_ascii_case("q") => Continuation::Stop,
        Ok(_) => Continuation::Continue,
    }
}
