//! BB84 TUI entry point.

use bb84_app::{App, Runtime};
use bb84_core::{Entropy, Mode, Speed, StdEntropy};
use bb84_tui::TerminalDriver;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// BB84 quantum key distribution visualizer
#[derive(Parser, Debug)]
#[command(name = "bb84-tui")]
#[command(about = "Terminal visualizer for the BB84 quantum key distribution protocol")]
#[command(version)]
struct Args {
    /// Backend base URL
    #[arg(short, long, default_value = "http://localhost:8000")]
    server: String,

    /// Number of transmission rounds
    #[arg(short = 'n', long, default_value_t = 8)]
    rounds: usize,

    /// Put Eve on the channel
    #[arg(long)]
    eve: bool,

    /// Probability that Eve intercepts a given round
    #[arg(long, default_value_t = 0.5, value_parser = parse_rate)]
    interception_rate: f64,

    /// Animation pacing between rounds
    #[arg(long, value_enum, default_value_t = SpeedArg::Normal)]
    speed: SpeedArg,

    /// Seed for client-side randomness (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,
}

/// CLI-facing pacing setting.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpeedArg {
    /// 1.5 s between rounds.
    Slow,
    /// 1 s between rounds.
    Normal,
    /// 0.5 s between rounds.
    Fast,
}

/// Parse an interception rate, rejecting NaN/infinities and out-of-range
/// values up front instead of surprising the user mid-run.
fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("not a number: {e}"))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err("interception rate must be between 0 and 1".to_string());
    }
    Ok(rate)
}

impl From<SpeedArg> for Speed {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Slow => Self::Slow,
            SpeedArg::Normal => Self::Normal,
            SpeedArg::Fast => Self::Fast,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The alternate screen owns stdout; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let entropy: Box<dyn Entropy> = match args.seed {
        Some(seed) => Box::new(StdEntropy::with_seed(seed)),
        None => Box::new(StdEntropy::from_os()),
    };
    let mode = if args.eve { Mode::WithEve } else { Mode::WithoutEve };
    let app = App::new(
        mode,
        args.rounds.max(1),
        args.speed.into(),
        args.interception_rate,
        entropy,
    );

    let driver = TerminalDriver::new(&args.server)?;
    Ok(Runtime::new(driver, app).run().await?)
}
