use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use compress_client::summary::{preview_row, render_report};
use compress_client::{
    BatchRunner, CompressClient, CompressOptions, DEFAULT_CONCURRENCY, FailurePolicy,
    FileSelection, SelectedFile, archive_offered, write_archive,
};
use compress_core::{DEFAULT_QUALITY, OutputFormat};
use tracing_subscriber::{EnvFilter, fmt};

/// 画像をまとめて webp / avif に圧縮する
#[derive(Parser, Debug)]
#[command(name = "compress-batch", version)]
#[command(about = "Compress a batch of png/jpg images to webp or avif via a compress-server")]
struct Args {
    /// Images to compress (png, jpg, jpeg)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Server base URL (falls back to COMPRESSOR_URL, then http://127.0.0.1:8080)
    #[arg(long)]
    server: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "avif", value_parser = parse_format)]
    format: OutputFormat,

    /// Quality, 5-100
    #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,

    /// Target width in pixels; height follows the aspect ratio
    #[arg(short, long)]
    width: Option<u32>,

    /// Maximum number of uploads in flight
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Directory the results are written to
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Stop sending new files after the first failure
    #[arg(long)]
    abort_on_error: bool,

    /// Also write optimized_images.zip when more than one file succeeded
    #[arg(long)]
    zip: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: compress_core::MediaError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout は結果一覧に使うのでログは stderr へ
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = CompressOptions::new(args.format, args.quality, args.width)?;

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = SelectedFile::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        files.push(file);
    }

    let mut selection = FileSelection::new();
    if let Err(e) = selection.select(files) {
        eprintln!("{e}");
    }
    selection
        .probe_with(|item| println!("{}", preview_row(item)))
        .await;

    let timeout = Duration::from_secs(args.timeout);
    let client = match args.server {
        Some(url) => CompressClient::new(url, timeout)?,
        None => CompressClient::from_env(timeout)?,
    };
    let policy = if args.abort_on_error {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Continue
    };
    let runner = BatchRunner::new(Arc::new(client))
        .with_concurrency(args.concurrency)
        .with_policy(policy);

    let report = runner.run(selection.files(), &options).await?;

    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    for compressed in report.successes() {
        let path = args.out.join(&compressed.filename);
        tokio::fs::write(&path, &compressed.bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    println!();
    for row in render_report(&report) {
        println!("{row}");
    }

    if args.zip && archive_offered(&report) {
        let path = write_archive(&args.out, &report).await?;
        println!("Download All Files: {}", path.display());
    }

    if report.success_count() == 0 {
        bail!("no file was compressed");
    }
    Ok(())
}
