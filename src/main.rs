use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use keyprint::profile::{load_session, Profile};
use keyprint::sim;
use keyprint::{encoding, synthesize, SynthConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// key|dwell|flight lines for key injectors
    Text,
    /// Full event list as JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "keyprint")]
#[command(about = "Synthesize keystroke sequences that type like a recorded user", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a keystroke sequence for a text
    Generate {
        /// Profile JSON file
        #[arg(long, value_name = "PATH")]
        profile: PathBuf,

        /// Input text file, or '-' for stdin
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        /// Output sequence file (defaults to stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Optional RNG seed (for debugging)
        #[arg(long)]
        seed: Option<u64>,

        /// Type the text cleanly, without injected errors
        #[arg(long)]
        no_errors: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the text an encoded sequence types
    Replay {
        /// Encoded sequence file, or '-' for stdin
        #[arg(long, value_name = "PATH")]
        sequence: PathBuf,
    },

    /// Summarize an encoded sequence
    Stats {
        /// Encoded sequence file, or '-' for stdin
        #[arg(long, value_name = "PATH")]
        sequence: PathBuf,
    },

    /// Fold a recorded session into a profile (created if missing)
    Absorb {
        #[arg(long, value_name = "PATH")]
        profile: PathBuf,

        /// Session JSON written by the recorder
        #[arg(long, value_name = "PATH")]
        session: PathBuf,
    },
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == std::ffi::OsStr::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: &PathBuf, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_profile(path: &PathBuf) -> Result<Profile> {
    Profile::from_path(path).with_context(|| format!("failed to load profile {}", path.display()))
}

fn read_sequence(path: &PathBuf) -> Result<keyprint::Sequence> {
    let text = read_input(path)?;
    encoding::decode(&text).with_context(|| format!("failed to decode {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keyprint=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            profile,
            input,
            output,
            seed,
            no_errors,
            format,
        } => {
            let profile = load_profile(&profile)?;
            let text = read_input(&input)?;
            let cfg = SynthConfig {
                inject_errors: !no_errors,
                ..Default::default()
            };
            let mut rng = rng_from_seed(seed);

            let seq = synthesize(&text, &profile, &cfg, &mut rng)?;

            let stats = sim::stats(&seq);
            info!(
                events = stats.events,
                corrections = stats.corrections,
                total_ms = stats.total_ms.round(),
                "generated sequence"
            );

            let rendered = match format {
                OutputFormat::Text => encoding::encode(&seq),
                OutputFormat::Json => {
                    serde_json::to_string_pretty(&seq).context("failed to serialize sequence")?
                }
            };
            if let Some(out) = output {
                write_output(&out, &rendered)?;
            } else {
                print!("{rendered}");
            }
        }
        Command::Replay { sequence } => {
            let seq = read_sequence(&sequence)?;
            print!("{}", sim::replay(&seq));
        }
        Command::Stats { sequence } => {
            let seq = read_sequence(&sequence)?;
            let stats = sim::stats(&seq);
            println!(
                "{} events, {} keys, {} shift, {} corrections, ~{:.1} s",
                stats.events,
                stats.key_events,
                stats.shift_events,
                stats.corrections,
                stats.total_ms / 1000.0
            );
        }
        Command::Absorb { profile, session } => {
            let mut current = if profile.exists() {
                load_profile(&profile)?
            } else {
                Profile::default()
            };
            let strokes = load_session(&session)
                .with_context(|| format!("failed to load session {}", session.display()))?;

            current.absorb_session(&strokes);
            info!(
                keystrokes = strokes.len(),
                sessions = current.session_count,
                "updated profile"
            );

            let json = current
                .to_json_pretty()
                .context("failed to serialize profile")?;
            write_output(&profile, &json)?;
        }
    }

    Ok(())
}
