//! Pinvend - pinned dependency vendoring
//!
//! Usage:
//!   pinvend                 # Vendor every package in the manifest
//!   pinvend fetch NAME...   # Vendor selected packages
//!   pinvend list            # Show declared packages

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pinvend_core::fetch::plan;
use pinvend_core::manifest::to_toml;
use pinvend_core::prelude::*;

#[derive(Parser)]
#[command(name = "pinvend")]
#[command(about = "Vendor third-party sources at pinned revisions", version)]
struct Cli {
    /// Manifest to read (defaults to ./vendor.toml, then the built-in list)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Verbose output (repeat for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Vendor declared packages (all of them unless names are given)
    Fetch(FetchArgs),
    /// List declared packages
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective manifest as TOML
    Manifest,
}

#[derive(Args, Default)]
struct FetchArgs {
    /// Package names to vendor, in any order
    names: Vec<String>,
    /// Override the vendor root from the manifest
    #[arg(long)]
    vendor_root: Option<PathBuf>,
    /// Stop at the first failing package
    #[arg(long)]
    fail_fast: bool,
    /// Print the commands that would run without touching the filesystem
    #[arg(long)]
    dry_run: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "pinvend=info,warn",
        1 => "pinvend=debug,info",
        _ => "pinvend=trace,info",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Returns `Ok(false)` when the command ran but some packages failed.
fn run(cli: Cli) -> Result<bool> {
    let (manifest, base_dir) = load_manifest(cli.manifest.as_deref())?;

    match cli.command {
        Some(Commands::Fetch(args)) => run_fetch(&manifest, &base_dir, args),
        None => run_fetch(&manifest, &base_dir, FetchArgs::default()),
        Some(Commands::List { format }) => {
            run_list(&manifest, format)?;
            Ok(true)
        }
        Some(Commands::Manifest) => {
            print!("{}", to_toml(&manifest).context("Failed to serialize manifest")?);
            Ok(true)
        }
    }
}

/// Load the manifest and the directory its relative paths resolve against.
fn load_manifest(explicit: Option<&Path>) -> Result<(Manifest, PathBuf)> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(cwd.join(MANIFEST_FILE)).filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading manifest");
            let manifest = Manifest::from_path(&path)?;
            let base_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or(cwd);
            Ok((manifest, base_dir))
        }
        None => {
            tracing::debug!("no {} found, using built-in manifest", MANIFEST_FILE);
            Ok((Manifest::builtin()?, cwd))
        }
    }
}

fn run_fetch(manifest: &Manifest, base_dir: &Path, args: FetchArgs) -> Result<bool> {
    let mut config = manifest.fetcher_config(base_dir);
    if let Some(root) = args.vendor_root {
        config.vendor_root = root;
    }
    let specs = manifest.select(args.names.as_slice())?;

    if specs.is_empty() {
        println!("{} No packages declared.", style("!").yellow());
        return Ok(true);
    }

    if args.dry_run {
        for spec in &specs {
            println!("# {}", spec);
            for command in plan(spec, &config)? {
                println!("{}", command);
            }
        }
        return Ok(true);
    }

    let policy = if args.fail_fast {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::Continue
    };
    let report = VendorFetcher::new(config).fetch_all(specs, policy);

    match args.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => print_report_json(&report)?,
    }

    Ok(report.is_success())
}

fn print_report(report: &VendorReport) {
    for outcome in &report.succeeded {
        println!(
            "  {} {} @ {}",
            style("✓").green(),
            outcome.name,
            outcome.reference
        );
    }
    for failure in &report.failed {
        println!(
            "  {} {} (after {}): {}",
            style("✗").red(),
            failure.name,
            failure.stage,
            failure.error
        );
    }
    for name in &report.skipped {
        println!("  {} {} (skipped)", style("-").dim(), name);
    }

    if report.is_success() {
        println!(
            "{} Vendored {} package(s).",
            style("✓").green(),
            report.succeeded.len()
        );
    } else {
        println!(
            "{} {} of {} package(s) failed.",
            style("✗").red(),
            report.failed.len(),
            report.total()
        );
    }
}

fn print_report_json(report: &VendorReport) -> Result<()> {
    let failed: Vec<_> = report
        .failed
        .iter()
        .map(|f| {
            serde_json::json!({
                "name": f.name,
                "stage": f.stage,
                "exit_code": f.error.exit_code(),
                "error": f.error.to_string(),
            })
        })
        .collect();

    let value = serde_json::json!({
        "success": report.is_success(),
        "succeeded": report.succeeded,
        "failed": failed,
        "skipped": report.skipped,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn run_list(manifest: &Manifest, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&manifest.packages)?);
        }
        OutputFormat::Text => {
            if manifest.packages.is_empty() {
                println!("{} No packages declared.", style("!").yellow());
            }
            for spec in &manifest.packages {
                println!(
                    "{:<4} {:<48} {}",
                    spec.kind,
                    spec.name,
                    style(&spec.reference).dim()
                );
            }
        }
    }
    Ok(())
}
