use std::{path::PathBuf, process::ExitCode};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use bcdplot::{figures, BatchConfig, FigureConfig};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Log at debug level (`RUST_LOG` takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every figure of a TOML batch file
    Render {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Open the figures in a window once saved
        #[arg(long)]
        show: bool,
    },
    /// Print the default configuration of a figure kind
    /// (phase-diagram, filling, energy, contour)
    Defaults {
        #[arg(value_name = "KIND")]
        kind: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Render { config, show } => {
            let mut batch = BatchConfig::from_path(&config)?;
            batch.show |= show;
            info!(config = %config.display(), figures = batch.figures.len(),
                  "rendering batch");
            for path in figures::run_batch(&batch)? {
                println!("{}", path.display());
            }
        }
        Command::Defaults { kind } => {
            let figure = FigureConfig::default_of(&kind)
                .ok_or_else(|| format!("unknown figure kind {:?}", kind))?;
            let batch = BatchConfig { show: false, figures: vec![figure] };
            print!("{}", batch.to_toml()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
