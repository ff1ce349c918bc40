//! sim-runner: headless runner for the training-completion simulator.
//!
//! Usage:
//!   sim-runner run --employees input/employees.csv --output generated_files
//!   sim-runner run --seed 12345 --history-db history.db --no-recommender
//!   sim-runner recommend 1001
//!   sim-runner config

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use trainsim_core::{
    catalog::format_content_id,
    clock::SystemClock,
    config::{
        RecommenderConfig, SimConfig, DEFAULT_API_BASE_URL, DEFAULT_API_ENDPOINT,
        DEFAULT_API_TIMEOUT_SECS, DEFAULT_RECENCY_WINDOW_DAYS,
    },
    engine::{RunSummary, SimEngine},
    roster::Roster,
    schedule::iso_utc,
};

#[derive(Parser, Debug)]
#[command(name = "sim-runner")]
#[command(about = "Synthetic training-completion simulator")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one simulation run over the roster
    Run {
        /// Master seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, env = "EMPLOYEES_FILE", default_value = "input/employees.csv")]
        employees: String,
    },
    /// Ask the recommender for one employee and print the answer
    Recommend { employee_id: u64 },
    /// Print the effective configuration as JSON
    Config,
}

#[derive(Args, Debug)]
struct Settings {
    #[arg(long, global = true, env = "API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    #[arg(long, global = true, env = "API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    api_endpoint: String,

    /// Recommender timeout in seconds
    #[arg(long, global = true, env = "API_TIMEOUT", default_value_t = DEFAULT_API_TIMEOUT_SECS)]
    api_timeout: u64,

    /// Run without the recommender; every employee gets no recommendations
    #[arg(long, global = true)]
    no_recommender: bool,

    /// Reject self-signed recommender certificates
    #[arg(long, global = true)]
    strict_tls: bool,

    /// SQLite completion history; enables open-assignment and recency lookups
    #[arg(long, global = true, env = "HISTORY_DB")]
    history_db: Option<String>,

    #[arg(long, global = true, env = "OUTPUT_DIR", default_value = "generated_files")]
    output: String,

    /// Keep whatever is already in the output directory
    #[arg(long, global = true)]
    keep_output: bool,

    #[arg(long, global = true, env = "USER_COMPLETION_TEMPLATE_FILE")]
    user_completion_template: Option<String>,

    /// JSON content catalog; the built-in catalog when omitted
    #[arg(long, global = true, env = "CONTENT_CATALOG_FILE")]
    catalog: Option<String>,

    #[arg(long, global = true, default_value_t = DEFAULT_RECENCY_WINDOW_DAYS)]
    recency_days: u32,

    /// Length of the random tag appended to artifact names (0 = none)
    #[arg(long, global = true, default_value_t = 0)]
    file_tag_len: usize,
}

impl Settings {
    fn to_config(&self) -> SimConfig {
        let recommender = (!self.no_recommender).then(|| RecommenderConfig {
            base_url: self.api_base_url.clone(),
            endpoint: self.api_endpoint.clone(),
            timeout_secs: self.api_timeout,
            accept_invalid_certs: !self.strict_tls,
        });
        SimConfig {
            recommender,
            history_db: self.history_db.clone(),
            output_dir: Some(self.output.clone()),
            clean_output_dir: !self.keep_output,
            user_completion_template: self.user_completion_template.clone(),
            catalog_path: self.catalog.clone(),
            recency_window_days: self.recency_days,
            file_tag_len: self.file_tag_len,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.settings.to_config();

    match cli.command {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Recommend { employee_id } => {
            let engine = SimEngine::build(recommend_run_id(), 0, config, Box::new(SystemClock))?;
            match engine.fetch_recommendations(employee_id) {
                Ok(recs) if recs.is_empty() => println!("no recommendations for {employee_id}"),
                Ok(recs) => {
                    for r in recs {
                        println!("  {:>12}  {}", format_content_id(r.content_id), r.name);
                    }
                }
                Err(e) => anyhow::bail!("recommender failed for {employee_id}: {e}"),
            }
        }
        Command::Run { seed, employees } => {
            let seed = seed.unwrap_or_else(rand::random);
            let roster = Roster::open(&employees)
                .with_context(|| format!("reading roster {employees}"))?;
            let run_id = format!("run-{}", uuid::Uuid::new_v4().simple());

            println!("training sim: sim-runner");
            println!("  seed:       {seed}");
            println!("  employees:  {} ({employees})", roster.employees.len());
            println!("  output:     {}", cli.settings.output);
            println!(
                "  history:    {}",
                config.history_db.as_deref().unwrap_or("(none)")
            );
            println!();

            let mut engine = SimEngine::build(run_id, seed, config, Box::new(SystemClock))?;
            let summary = engine.run(&roster)?;
            print_summary(&engine, &summary)?;
        }
    }
    Ok(())
}

fn recommend_run_id() -> String {
    format!("recommend-{}", uuid::Uuid::new_v4().simple())
}

fn print_summary(engine: &SimEngine, summary: &RunSummary) -> Result<()> {
    let degraded = engine
        .store
        .event_count(&summary.run_id, "source_degraded")?;

    println!("=== RUN SUMMARY ===");
    println!("  run_id:          {}", summary.run_id);
    println!("  employees:       {}", summary.employees);
    println!("  imported open:   {}", summary.imported);
    println!("  generated:       {}", summary.generated);
    println!("  completions:     {}", summary.completions.len());
    println!("  removed:         {}", summary.reconciliation.removed_count);
    println!("  still open:      {}", summary.reconciliation.unchanged_count());
    println!("  degraded calls:  {degraded}");
    if !summary.failed_employees.is_empty() {
        println!("  failed:          {:?}", summary.failed_employees);
    }

    println!();
    println!("=== ARTIFACTS ===");
    if summary.artifacts.is_empty() {
        println!("  (nothing written)");
    }
    for path in &summary.artifacts {
        println!("  {}", path.display());
    }

    if let Some(first) = summary.completions.first() {
        println!();
        println!("  completions stamped {} → {}", iso_utc(&first.started_at), iso_utc(&first.completed_at));
    }
    Ok(())
}
