use std::path::PathBuf;

use accweek_tools::aggregate::Variant;
use accweek_tools::classify::RuleSet;
use accweek_tools::config::Config;
use accweek_tools::{Result, ToolError, inspect, pipeline};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(output_dir) = cli.output_dir {
        config.paths.output_dir = output_dir;
    }

    match cli.command {
        Command::Summarize => {
            let report = pipeline::summarize(&config)?;
            println!("sales summary: {}", report.sales_path.display());
            println!("inventory summary: {}", report.inventory_path.display());
            Ok(())
        }
        Command::Forecast => {
            let report = pipeline::forecast(&config)?;
            println!("forecast summary: {}", report.path.display());
            Ok(())
        }
        Command::Inspect(args) => execute_inspect(args, config),
    }
}

fn execute_inspect(args: InspectArgs, mut config: Config) -> Result<()> {
    if let Some(rule_set) = args.rule_set {
        config.classifier.rule_set = rule_set.into();
    }
    let report = inspect::inspect_file(&args.input, args.variant.into(), &config, args.samples)?;
    print!("{report}");
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Aggregate accessory sales and inventory extracts into JSON summaries."
)]
struct Cli {
    /// Optional TOML file overriding the built-in paths and constants.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory the JSON summaries are written to.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the sales and inventory summaries for the analysis months.
    Summarize,
    /// Build the incoming-stock forecast summary.
    Forecast,
    /// Report how the rows of one extract split between core and outlet.
    Inspect(InspectArgs),
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Extract to inspect.
    input: PathBuf,

    /// Which amount column the extract carries.
    #[arg(long, value_enum, default_value_t = VariantKind::Inventory)]
    variant: VariantKind,

    /// Classification rule set, overriding the configuration.
    #[arg(long, value_enum)]
    rule_set: Option<RuleSetKind>,

    /// Number of sample classifications to print.
    #[arg(long, default_value_t = 50)]
    samples: usize,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum VariantKind {
    Sales,
    Inventory,
}

impl From<VariantKind> for Variant {
    fn from(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Sales => Variant::Sales,
            VariantKind::Inventory => Variant::Inventory,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RuleSetKind {
    Standard,
    Extended,
}

impl From<RuleSetKind> for RuleSet {
    fn from(kind: RuleSetKind) -> Self {
        match kind {
            RuleSetKind::Standard => RuleSet::Standard,
            RuleSetKind::Extended => RuleSet::Extended,
        }
    }
}
