// crates/raffle_cli/src/main.rs
//
// CLI flow: parse → load snapshot → pick index source → run_draw → print / write.
// Exit codes are stable for scripts; see `exitcodes`.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Bad flags, bad snapshot content, invalid request.
    pub const VALIDATION: i32 = 2;
    /// Not enough eligible entrants.
    pub const INSUFFICIENT: i32 = 3;
    pub const IO: i32 = 4;
}

use std::process::ExitCode;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Validated};
use raffle_core::rng::ChaChaIndexSource;
use raffle_io::{canonical_json, snapshot};
use raffle_pipeline::{result_listing, run_draw, DrawCtx, DrawError, DrawForm, DrawReport, PipelineError};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Insufficient(String),
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Insufficient(m) | MainError::Io(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let v = match parse_cli() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("raffle: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_logging(v.args.verbose);

    let rc = match run_once(&v) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("raffle: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// Logs go to stderr so stdout stays a clean winner listing.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_once(v: &Validated) -> Result<(), MainError> {
    let args = &v.args;

    let loaded = snapshot::load_snapshot(&args.snapshot).map_err(|e| map_pipeline_err(e.into()))?;
    debug!(sha256 = %loaded.sha256, entrants = loaded.snapshot.entrants.len(), "snapshot loaded");

    let ctx = DrawCtx::new(loaded).with_seed(args.seed);
    let form = DrawForm::new(v.category.clone(), v.mode).all_in(args.all_in);

    let report = match args.seed {
        Some(seed) => run_draw(&form, &ctx, &mut ChaChaIndexSource::from_seed_u64(seed)),
        None => run_draw(&form, &ctx, &mut ChaChaIndexSource::from_entropy()),
    }
    .map_err(map_pipeline_err)?;

    write_artifacts(v, &report)?;

    if !args.quiet {
        print_winners(&ctx, &report);
    }
    if args.list {
        print_listing(&ctx, &report);
    }
    Ok(())
}

fn print_winners(ctx: &DrawCtx, report: &DrawReport) {
    let snap = ctx.snapshot();
    for id in &report.winners {
        println!("{id}\t{}", snap.display_name(*id));
    }
    eprintln!(
        "draw: {} winner(s) for {} ({} preset), {} still eligible",
        report.winners.len(),
        report.category,
        report.preset_count,
        report.remaining_pool
    );
}

/// History first: a record file only ever exists for a draw whose history was persisted.
/// Every category's recorded winners after this draw: a `key\tname\tcount`
/// header per category, then one indented `id\tname` line per winner.
fn print_listing(ctx: &DrawCtx, report: &DrawReport) {
    for row in result_listing(ctx.snapshot(), &report.history) {
        println!("{}\t{}\t{}", row.key, row.name, row.winners.len());
        for (id, name) in &row.winners {
            println!("\t{id}\t{name}");
        }
    }
}

fn write_artifacts(v: &Validated, report: &DrawReport) -> Result<(), MainError> {
    if let Some(path) = &v.args.write_history {
        canonical_json::write_canonical_file(&report.history, path)
            .map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))?;
    }
    if let Some(path) = &v.args.out {
        canonical_json::write_canonical_file(&report.record, path)
            .map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))?;
    }
    Ok(())
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Insufficient(_) => INSUFFICIENT,
        MainError::Io(_) => IO,
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Validate(m) => MainError::Validation(m),
        PipelineError::Draw(d @ DrawError::InsufficientPool { .. }) => MainError::Insufficient(d.to_string()),
        PipelineError::Draw(d) => MainError::Validation(d.to_string()),
        PipelineError::Io(m) | PipelineError::Build(m) => MainError::Io(m),
    }
}
