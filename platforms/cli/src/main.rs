use beaver::{BeaverError, CheckpointLoop, LoopConfig, BATCH_SIZE, TICKS_PER_PASS};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the checkpoint files
    #[clap(short, long, default_value = ".")]
    dir: PathBuf,

    /// Number of checkpoint cycles to run
    #[clap(short, long, default_value_t = 10)]
    cycles: usize,

    /// Ticks each machine is advanced by per cycle (0 only rewrites the batches)
    #[clap(short, long, default_value_t = TICKS_PER_PASS)]
    ticks: u64,

    /// Number of machines per checkpoint file
    #[clap(
        short,
        long,
        default_value_t = BATCH_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    batch_size: usize,

    /// Cursor of the first cycle
    #[clap(long, default_value_t = 0)]
    cursor: u64,

    /// Print a JSON report of every cycle
    #[clap(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> LoopConfig {
        LoopConfig {
            directory: self.dir.clone(),
            batch_size: self.batch_size,
            ticks_per_pass: self.ticks,
            start_cursor: self.cursor,
        }
    }
}

/// Logs go to stderr so `--json` output stays clean. `RUST_LOG` overrides the filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,beaver=info,beaver_cli=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), BeaverError> {
    info!(dir = %cli.dir.display(), cycles = cli.cycles, ticks = cli.ticks, "starting search");
    let mut checkpoint = CheckpointLoop::new(cli.config())?;

    for _ in 0..cli.cycles {
        let report = checkpoint.run_cycle()?;

        if cli.json {
            let line = serde_json::to_string(&report)
                .map_err(|e| BeaverError::FileError(format!("Failed to encode report: {}", e)))?;
            println!("{}", line);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(&cli) {
        match &e {
            BeaverError::Checkpoint { path, .. } if e.is_truncated() => {
                eprintln!("{} contains too few machines; aborting!", path.display());
            }
            _ => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}
