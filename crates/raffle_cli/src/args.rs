// crates/raffle_cli/src/args.rs
//
// Offline CLI argument surface.
// - No networked paths (reject any scheme:// like http/https/file)
// - --mode custom requires --qty; --qty is only meaningful with custom
// - Seed is a u64 decimal or 0x-hex (≤16 hex digits); absent → entropy source

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use raffle_core::{ids::CategoryId, mode::DrawMode};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "raffle",
    disable_help_subcommand = true,
    about = "Offline raffle draw over a local snapshot"
)]
pub struct Args {
    /// Snapshot JSON (config, entrants, exclusions, recorded results).
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Category key to draw.
    #[arg(long)]
    pub category: String,

    /// How many winners to draw.
    #[arg(long, default_value = "one", value_parser = ["one", "five", "remain", "custom"])]
    pub mode: String,

    /// Quantity for --mode custom.
    #[arg(long, allow_negative_numbers = true)]
    pub qty: Option<i64>,

    /// Draw from all remaining entrants (recorded winners stay excluded).
    #[arg(long)]
    pub all_in: bool,

    /// Seed for a reproducible draw. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Write the draw record (canonical JSON) here.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write the updated result history (canonical JSON) here.
    #[arg(long)]
    pub write_history: Option<PathBuf>,

    /// Suppress the winner listing on stdout.
    #[arg(long)]
    pub quiet: bool,

    /// After the draw, list every category's recorded winners on stdout.
    #[arg(long)]
    pub list: bool,

    /// Debug-level logs on stderr (RUST_LOG takes precedence).
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Errors surfaced by argument parsing/validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    BadCombo(&'static str),
    Missing(&'static str),
    NonLocalPath(String),
    NotFound(String),
    BadCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            Missing(s) => write!(f, "missing required flag: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadCategory(c) => write!(f, "invalid category key: {c}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Validated view used by main.rs.
#[derive(Debug, Clone)]
pub struct Validated {
    pub args: Args,
    pub category: CategoryId,
    pub mode: DrawMode,
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Validated, CliError> {
    validate(Args::parse())
}

pub fn validate(args: Args) -> Result<Validated, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }
    ensure_local_exists(&args.snapshot, "--snapshot")?;

    let category = args
        .category
        .parse::<CategoryId>()
        .map_err(|_| CliError::BadCategory(args.category.clone()))?;
    let mode = resolve_mode(&args.mode, args.qty)?;

    Ok(Validated { args, category, mode })
}

fn resolve_mode(token: &str, qty: Option<i64>) -> Result<DrawMode, CliError> {
    match (token, qty) {
        ("custom", Some(q)) => Ok(DrawMode::Custom(q)),
        ("custom", None) => Err(CliError::Missing("--qty (required by --mode custom)")),
        (_, Some(_)) => Err(CliError::BadCombo("--qty is only valid with --mode custom")),
        ("one", None) => Ok(DrawMode::One),
        ("five", None) => Ok(DrawMode::Five),
        ("remain", None) => Ok(DrawMode::Remain),
        _ => Err(CliError::BadCombo("unknown --mode")),
    }
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        Some(args.snapshot.as_path()),
        args.out.as_deref(),
        args.write_history.as_deref(),
    ]
    .into_iter()
    .flatten()
}

/// Ensure a path exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}
