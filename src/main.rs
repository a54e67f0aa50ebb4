use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;

use flexbackup::cli::{
    handle_cycle_command, handle_gc_command, handle_plan_command, handle_run_command,
    parse_date_arg,
};
use flexbackup::config::{BackupConfig, ConfigPaths};
use flexbackup::models::Tier;
use flexbackup::schedule::{Cycle, DateClock, FixedClock, SystemClock};

#[derive(Parser)]
#[command(
    name = "flexbackup-manager",
    author = "Chen Yun-Chih",
    version,
    about = "Tiered backup scheduler for flexbackup",
    long_about = "flexbackup-manager decides, for each calendar day, which backup sets \
                  receive a full backup and which an incremental one, drives flexbackup \
                  to produce them, and prunes old snapshots according to a per-tier \
                  retention policy. Intended to be run once a day from cron."
)]
struct Cli {
    /// Configuration file (defaults to $FLEXBACKUP_CONFIG or ./home-backup-list.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run today's backups, then prune old snapshots (default)
    Run {
        /// Pass -n to flexbackup and leave existing snapshots untouched
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Show which sets get a full and which an incremental backup
    Plan {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the whole backup cycle
    Cycle {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Show stale snapshots and optionally delete them
    #[command(alias = "prune")]
    Gc {
        /// Actually delete the stale snapshots
        #[arg(short, long)]
        force: bool,
    },

    /// Check the configuration file
    Validate,

    /// Show current configuration and paths
    Config,
}

fn clock_for(date: Option<NaiveDate>) -> Box<dyn DateClock> {
    match date {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let paths = ConfigPaths::resolve(cli.config.as_deref())?;
    let config = BackupConfig::load(paths.config_file())
        .with_context(|| format!("Invalid configuration {}", paths.config_file().display()))?;

    match cli.command.unwrap_or(Commands::Run {
        dry_run: false,
        date: None,
    }) {
        Commands::Run { dry_run, date } => {
            let clock = clock_for(date);
            let report = handle_run_command(&config, clock.as_ref(), dry_run)?;
            if !report.all_succeeded() {
                warn!(
                    failed = report.failed.len(),
                    "some backup runs failed, see the log above"
                );
            }
        }
        Commands::Plan { date, json } => {
            let clock = clock_for(date);
            handle_plan_command(&config, clock.as_ref(), json)?;
        }
        Commands::Cycle { date } => {
            let clock = clock_for(date);
            handle_cycle_command(&config, clock.as_ref())?;
        }
        Commands::Gc { force } => {
            handle_gc_command(&config, force)?;
        }
        Commands::Validate => {
            let cycle = Cycle::from_config(&config);
            println!("Configuration OK: {}", paths.config_file().display());
            println!(
                "  tier1: {} set(s) in {} slot(s)",
                config.sets(Tier::Tier1).len(),
                config.slots(Tier::Tier1).len()
            );
            println!(
                "  tier2: {} set(s) in {} slot(s)",
                config.sets(Tier::Tier2).len(),
                config.slots(Tier::Tier2).len()
            );
            println!("  cycle length: {} day(s)", cycle.len());
        }
        Commands::Config => {
            println!("flexbackup-manager Configuration");
            println!("================================");
            println!("Config file:        {}", paths.config_file().display());
            println!("Template file:      {}", config.template_file.display());
            println!("Root directory:     {}", config.root_directory.display());
            println!("Destination:        {}", config.dest_directory.display());
            println!("Archiver:           {}", config.archiver.program);
            println!();
            println!("Settings:");
            println!(
                "  Incremental frequency: tier1 every {} day(s), tier2 every {} day(s)",
                config.incremental_backup_frequency.tier1,
                config.incremental_backup_frequency.tier2
            );
            println!(
                "  Retention:             tier1 keeps {}, tier2 keeps {}",
                config.retention.tier1, config.retention.tier2
            );
            if !config.exclude_patterns.is_empty() {
                println!("  Exclude patterns:      {}", config.exclude_patterns.join(" "));
            }
        }
    }

    Ok(())
}
