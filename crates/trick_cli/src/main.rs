//! trick_judge CLI
//!
//! Judges recorded trick attempts from JSON frame dumps.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "trick_judge")]
#[command(about = "Judge skateboard trick attempts from recorded frames", long_about = None)]
struct Cli {
    /// Threshold profile: default, lenient or strict
    #[arg(long, global = true)]
    profile: Option<String>,

    /// JSON threshold file (overrides --profile)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Judge one attempt
    Validate {
        /// Frames JSON file
        #[arg(long)]
        frames: PathBuf,

        /// Trick the rider called
        #[arg(long)]
        trick: String,

        /// Rule table YAML (defaults to the built-in table)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Append the verdict to this JSON lines file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Session UUID for the recorded verdict
        #[arg(long, requires = "record")]
        session: Option<String>,

        /// Print the full analysis report instead of the verdict
        #[arg(long, default_value = "false")]
        report: bool,

        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// Judge every attempt listed in a manifest
    Batch {
        /// Manifest JSON: {"attempts": [{"trick", "frames", "sessionId"?}]}
        #[arg(long)]
        manifest: PathBuf,

        #[arg(long)]
        rules: Option<PathBuf>,

        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// List the rule table
    Rules {
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    use trick_cli::{describe_rules, judge_file, judge_manifest, load_frames, load_rules, resolve_config, to_json};
    use trick_core::ArbitrationEngine;

    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(cli.profile.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { frames, trick, rules, record, session, report, pretty } => {
            let engine = ArbitrationEngine::new(load_rules(rules.as_deref())?, config);
            if report {
                let sequence = load_frames(&frames)?;
                println!("{}", to_json(&engine.analyze(&sequence, &trick), pretty)?);
            } else {
                let record = record.as_deref().map(|path| (path, session.as_deref()));
                let validation = judge_file(&engine, &frames, &trick, record)?;
                println!("{}", to_json(&validation, pretty)?);
            }
        }

        Commands::Batch { manifest, rules, pretty } => {
            let engine = ArbitrationEngine::new(load_rules(rules.as_deref())?, config);
            let outcomes = judge_manifest(&engine, &manifest)?;
            println!("{}", to_json(&outcomes, pretty)?);
        }

        Commands::Rules { rules } => {
            print!("{}", describe_rules(&load_rules(rules.as_deref())?));
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("trick_judge CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
