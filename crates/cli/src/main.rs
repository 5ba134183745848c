use anyhow::{Context, Result};
use clap::Parser;
use codebundle_bundler::{ChunkingConfig, ChunkingOutcome, SemanticChunker};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codebundle")]
#[command(about = "Split a codebase into dependency-aware, token-bounded chunks", long_about = None)]
#[command(version)]
struct Cli {
    /// Codebase root directory
    path: PathBuf,

    /// Target token size of a chunk
    #[arg(long, default_value_t = 8000)]
    max_chunk_tokens: usize,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Language variant (rust, python, typescript, javascript, generic)
    #[arg(long)]
    language: Option<String>,

    /// Traversal depth bound from each root
    #[arg(long)]
    max_depth: Option<usize>,

    /// Token ceiling above which groups are split
    #[arg(long)]
    max_group_tokens: Option<usize>,

    /// Include glob (repeatable, replaces the language defaults)
    #[arg(long = "include")]
    include: Vec<String>,

    /// Exclude glob (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Print the full outcome as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = build_config(&cli)?;
    let mut chunker = SemanticChunker::new(config).context("Invalid configuration")?;
    let outcome = chunker
        .run(&cli.path, cli.max_chunk_tokens)
        .with_context(|| format!("Failed to chunk {}", cli.path.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied
fn build_config(cli: &Cli) -> Result<ChunkingConfig> {
    let mut config = match &cli.config {
        Some(path) => ChunkingConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ChunkingConfig::default(),
    };

    if let Some(language) = &cli.language {
        config.codebase_language = language.clone();
    }
    if let Some(depth) = cli.max_depth {
        config.max_recursion_depth = depth;
    }
    if let Some(tokens) = cli.max_group_tokens {
        config.max_group_tokens = tokens;
    }
    if !cli.include.is_empty() {
        config.include_patterns = cli.include.clone();
    }
    config.exclude_patterns.extend(cli.exclude.iter().cloned());

    Ok(config)
}

fn print_summary(outcome: &ChunkingOutcome) {
    let report = &outcome.report;
    println!(
        "{} chunks, {} tokens, {} units from {} files ({} failed)",
        report.chunks,
        report.total_tokens,
        report.units,
        report.files_read,
        report.failed_files.len()
    );

    for chunk in &outcome.chunks {
        println!(
            "#{:<4} {:>7} tokens  {:>4} units  {:>3} files  {}",
            chunk.index,
            chunk.token_estimate,
            chunk.unit_count,
            chunk.file_count,
            chunk.checksum.get(..12).unwrap_or(&chunk.checksum)
        );
    }

    for failed in &report.failed_files {
        println!("skipped {}: {}", failed.path, failed.reason);
    }
}
