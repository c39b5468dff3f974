use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use datasz::render::OutputFormat;
use datasz::settings::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "datasz")]
#[command(about = "Estimate diagnostic output volume and storage cost for a model run")]
struct Args {
    /// Run configuration to read
    #[arg(long, default_value = "rose-app.conf")]
    config: PathBuf,

    /// Directory holding STASHmaster_A
    #[arg(short = 's', long, env = "DATASZ_STASH_DIR")]
    stash_dir: Option<String>,

    /// Packing-ratio database
    #[arg(short = 'd', long, env = "DATASZ_RATIO_DB")]
    ratio_db: Option<String>,

    /// Storage price per TiB per year
    #[arg(short = 'c', long, env = "DATASZ_PRICE")]
    price: Option<f64>,

    /// Optional YAML settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let resolved = settings.resolve(Overrides {
        stash_dir: args.stash_dir,
        ratio_db: args.ratio_db,
        price_per_tib: args.price,
    })?;

    info!(config = %args.config.display(), stash_dir = %resolved.stash_dir.display(), "Starting estimate");

    let output = datasz::execute(&args.config, &resolved, args.format)?;
    print!("{}", output);
    Ok(())
}
