use anyhow::Context;
use binlens_common::Config;
use binlens_core::{
    bin_columns, describe_columns, export_csv, export_json, open_source, print_summary,
    render_table, write_csv, BinningOptions, BoundaryPolicy, ChartSeries,
};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn parse_bins(s: &str) -> Result<usize, String> {
    let v: usize = s.parse().map_err(|_| format!("not a positive integer: {s}"))?;
    if v > 0 { Ok(v) } else { Err("bin count must be at least 1".into()) }
}

#[derive(Parser)]
#[command(name = "binlens", version, about = "Histogram binning for paired numeric columns")]
struct Cli {
    /// -v for info, -vv for debug (RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bin one or more independent columns against a dependent column
    Bin {
        path: PathBuf,
        #[arg(long = "x", value_delimiter = ',', required = true)]
        x: Vec<String>,
        #[arg(long = "y")]
        y: String,
        #[arg(long, value_parser = parse_bins)]
        bins: Option<usize>,
        /// Leave the last bin open on its upper edge
        #[arg(long)]
        half_open: bool,
        /// Display label for the dependent axis
        #[arg(long)]
        label: Option<String>,
        /// Decimal places for range labels
        #[arg(long)]
        precision: Option<u32>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the columns of a data file
    Columns {
        path: PathBuf,
        /// Include non-numeric columns
        #[arg(long)]
        all: bool,
    },
    /// Print the effective configuration
    Config {
        #[arg(long)]
        save: bool,
    },
    /// Generate a shell completion script
    Completions { shell: clap_complete::Shell },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("ignoring config at {}: {e}", Config::config_path().display());
            Config::default()
        }
    };
    match cli.command {
        Commands::Bin { path, x, y, bins, half_open, label, precision, format, output } => {
            let mut options = BinningOptions::from(&config.binning);
            if let Some(b) = bins { options.target_bin_count = b; }
            if half_open { options.boundary = BoundaryPolicy::HalfOpen; }
            let args = BinArgs { path, x, y, label, precision, format, output };
            run_bin(args, options, &config)?
        }
        Commands::Columns { path, all } => run_columns(&path, all)?,
        Commands::Config { save } => run_config(&config, save)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "binlens", &mut std::io::stdout());
        }
    }
    Ok(())
}

struct BinArgs {
    path: PathBuf,
    x: Vec<String>,
    y: String,
    label: Option<String>,
    precision: Option<u32>,
    format: Option<String>,
    output: Option<PathBuf>,
}

fn run_bin(args: BinArgs, options: BinningOptions, config: &Config) -> anyhow::Result<()> {
    if !args.path.exists() { anyhow::bail!("input not found: {}", args.path.display()); }
    let source = open_source(&args.path)
        .with_context(|| format!("opening {}", args.path.display()))?;
    let precision = args.precision.or(config.display.label_precision);
    let mut series = bin_columns(&*source, &args.x, &args.y, &options, precision)?;
    if let Some(label) = args.label.as_deref().or(config.display.dependent_label.as_deref()) {
        series = series.into_iter().map(|s| s.with_dependent_label(label)).collect();
    }
    // a file target defaults to the configured export format, the terminal to a table
    let format = match (args.format, &args.output) {
        (Some(f), _) => f,
        (None, Some(_)) => config.export.format.clone(),
        (None, None) => "table".into(),
    };
    match (format.as_str(), args.output) {
        ("table", None) => print_tables(&series)?,
        ("table", Some(_)) => anyhow::bail!("table output goes to the terminal; use json or csv with --output"),
        ("json", Some(out)) => {
            let out = resolve_output(&out, config)?;
            export_json(&out, &series)?;
            println!("Exported to {}", out.display());
        }
        ("json", None) => {
            let doc = serde_json::json!({ "series": series });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        ("csv", Some(out)) => {
            let out = resolve_output(&out, config)?;
            export_csv(&out, &series)?;
            println!("Exported to {}", out.display());
        }
        ("csv", None) => write_csv(&mut std::io::stdout().lock(), &series)?,
        (other, _) => anyhow::bail!("Unknown format: {other} (use table, json or csv)"),
    }
    Ok(())
}

/// Relative output paths land in the configured export directory.
fn resolve_output(out: &Path, config: &Config) -> anyhow::Result<PathBuf> {
    let path = if out.is_relative() && out.parent().map_or(true, |p| p.as_os_str().is_empty()) {
        Path::new(&config.export.output_dir).join(out)
    } else {
        out.to_path_buf()
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
    }
    Ok(path)
}

fn print_tables(series: &[ChartSeries]) -> anyhow::Result<()> {
    for (i, s) in series.iter().enumerate() {
        if i > 0 { println!(); }
        print_summary(s);
        if !s.is_empty() { println!("{}", render_table(s)?); }
    }
    Ok(())
}

fn run_columns(path: &Path, all: bool) -> anyhow::Result<()> {
    let is_parquet = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        for c in describe_columns(path)? {
            if all || c.numeric { println!("{:<24} {}", c.name, c.data_type); }
        }
        return Ok(());
    }
    let source = open_source(path)?;
    let names = if all { source.column_names()? } else { source.numeric_columns()? };
    for name in names { println!("{name}"); }
    Ok(())
}

fn run_config(config: &Config, save: bool) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    if save {
        let path = config.save()?;
        println!("Config saved to {}", path.display());
    }
    Ok(())
}
