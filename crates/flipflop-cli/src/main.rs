// crates/flipflop-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

mod io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flipflop_core::{compute_transition_posteriors, decode_posteriors, score_sequence};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "flipflop-cli",
    about = "Flip-flop CRF decoding CLI",
    long_about = "Compute transition posteriors, decode the best state path into a basecall, or score a candidate sequence against a posterior window.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Convert per-block transition log-weights into row-normalized
    /// transition posteriors.
    Posteriors {
        /// Input path to a `[nblocks, T]` logprob matrix (JSON)
        #[arg(long)]
        logprob: PathBuf,

        /// Output path for the posterior matrix (JSON)
        #[arg(long, default_value = "tpost.json")]
        out: PathBuf,

        /// Emit probabilities instead of log posteriors
        #[arg(long, default_value_t = false)]
        prob: bool,
    },

    /// Decode the best state path through a posterior matrix into a
    /// basecall string.
    Decode {
        /// Input path to a `[nblocks, T]` transition-posterior matrix (JSON)
        #[arg(long)]
        tpost: PathBuf,

        /// Alphabet to map canonical base indices onto
        #[arg(long, default_value = "ACGT")]
        alphabet: String,
    },

    /// Score a candidate sequence against a window of a posterior matrix.
    Score {
        /// Input path to a `[nblocks, T]` transition-posterior matrix (JSON)
        #[arg(long)]
        tpost: PathBuf,

        /// Candidate sequence as an index string over `alphabet`, e.g. "ACGT"
        #[arg(long)]
        seq: String,

        /// Alphabet the sequence indexes into
        #[arg(long, default_value = "ACGT")]
        alphabet: String,

        /// First block row to score (inclusive)
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Last block row to score (exclusive); defaults to every row
        #[arg(long)]
        end: Option<usize>,

        /// Sum over every alignment (log-sum-exp) instead of the best path
        #[arg(long, default_value_t = false)]
        all_paths: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Posteriors { logprob, out, prob } => posteriors(logprob, out, prob),
        Cmd::Decode { tpost, alphabet } => decode(tpost, alphabet),
        Cmd::Score {
            tpost,
            seq,
            alphabet,
            start,
            end,
            all_paths,
        } => score(tpost, seq, alphabet, start, end, all_paths),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn posteriors(logprob: PathBuf, out: PathBuf, prob: bool) -> Result<()> {
    info!(logprob=%logprob.display(), out=%out.display(), prob, "computing transition posteriors");
    let logprob_m = io::read_matrix(&logprob)?;
    let tpost = compute_transition_posteriors(&logprob_m, !prob)
        .context("computing transition posteriors")?;
    io::write_matrix(&out, &tpost)?;

    println!(
        "Computed posteriors: {}x{} -> {}",
        tpost.rows(),
        tpost.cols(),
        out.display()
    );
    Ok(())
}

fn decode(tpost: PathBuf, alphabet: String) -> Result<()> {
    info!(tpost=%tpost.display(), %alphabet, "decoding");
    let tpost_m = io::read_matrix(&tpost)?;
    let decoded = decode_posteriors(&tpost_m, &alphabet, None, None).context("decoding path")?;

    println!("basecall: {}", decoded.basecall);
    println!("score: {}", decoded.score);
    println!("rl_cumsum: {:?}", decoded.rl_cumsum);
    Ok(())
}

fn alphabet_index(alphabet: &str, ch: char) -> Result<usize> {
    alphabet
        .chars()
        .position(|c| c == ch)
        .with_context(|| format!("symbol '{ch}' is not in alphabet '{alphabet}'"))
}

fn score(
    tpost: PathBuf,
    seq: String,
    alphabet: String,
    start: usize,
    end: Option<usize>,
    all_paths: bool,
) -> Result<()> {
    info!(tpost=%tpost.display(), %seq, start, ?end, all_paths, "scoring sequence");
    let tpost_m = io::read_matrix(&tpost)?;
    let end = end.unwrap_or(tpost_m.rows());

    let indices: Vec<usize> = seq
        .chars()
        .map(|c| alphabet_index(&alphabet, c))
        .collect::<Result<_>>()?;

    let result = score_sequence(&tpost_m, &indices, start, end, all_paths)
        .context("scoring sequence")?;

    println!("score: {result}");
    Ok(())
}
