use clap::{Parser, Subcommand, ValueEnum};
use overlay_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "overlay")]
#[command(about = "Poly-substance harm-reduction risk overlay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess the activity log (default)
    Assess {
        /// Log file (.jsonl or .csv); defaults to the configured log path
        #[arg(long)]
        log: Option<PathBuf>,

        /// Evaluation instant (RFC 3339); defaults to the current time
        #[arg(long)]
        now: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show how substance names are classified
    Classify {
        /// Substance names or aliases
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print the config file path in use
    ConfigPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    overlay_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_or_default(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Assess { log, now, format }) => cmd_assess(log, now, format, &config),
        Some(Commands::Classify { names }) => {
            cmd_classify(&names);
            Ok(())
        }
        Some(Commands::ConfigPath) => {
            let path = cli.config.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
            Ok(())
        }
        None => cmd_assess(None, None, OutputFormat::Text, &config),
    }
}

fn cmd_assess(
    log: Option<PathBuf>,
    now: Option<String>,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let now = match now {
        Some(raw) => parse_timestamp(&raw)
            .ok_or_else(|| Error::Other(format!("Invalid --now timestamp: {}", raw)))?,
        None => chrono::Utc::now(),
    };

    let log_path = log.unwrap_or_else(|| config.data.log_path.clone());
    let entries = load_entries(&log_path)?;
    tracing::debug!("Loaded {} entries from {:?}", entries.len(), log_path);

    let result = assess_with(&entries, now, &config.engine);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => display_result(&result),
    }

    Ok(())
}

fn cmd_classify(names: &[String]) {
    for name in names {
        let classification = resolve(name);
        println!(
            "{} -> {} ({})",
            name, classification.canonical, classification.category
        );
    }
}

fn display_result(result: &RiskOverlayResult) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  OVERALL RISK: {}", result.overall_level.as_str().to_uppercase());
    println!("╰─────────────────────────────────────────╯");

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  ⚠ {}", warning);
        }
    }

    if !result.stacks.is_empty() {
        println!("\nStacking:");
        for stack in &result.stacks {
            println!("  → {} [{}] x{}", stack.category, stack.level, stack.count);
            println!("    {}", stack.rationale);
        }
    }

    if !result.rebound.is_empty() {
        println!("\nRebound windows:");
        for window in &result.rebound {
            println!(
                "  → {}: {} to {}",
                window.category,
                window.window_start.format("%Y-%m-%d %H:%M UTC"),
                window.window_end.format("%Y-%m-%d %H:%M UTC")
            );
            println!("    {}", window.risks.join("; "));
        }
    }

    println!();
    for note in &result.notes {
        println!("  ℹ {}", note);
    }
    println!();
}
