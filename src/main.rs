use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use furigloss::aligner::{OverlayConfig, WritingMode};
use furigloss::discovery::{self, DiscoveryConfig};
use furigloss::incremental::aux_file_exists;
use furigloss::processing::{process_job, FileStats, RunStats};
use furigloss::reader::{DocumentReader, ReaderConfig};
use furigloss::restart_log::RestartLog;

#[derive(Parser, Debug)]
#[command(name = "furigloss")]
#[command(about = "Overlay furigana and vocabulary annotations onto parsed documents")]
#[command(version)]
struct Args {
    /// Root directory to scan for *.doc.json files with matching *.parse.json
    root_dir: PathBuf,

    /// Re-annotate documents that already have output
    #[arg(long)]
    overwrite_all: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Keep replaced text nodes hidden inside their replacement
    #[arg(long)]
    keep_original: bool,

    /// Anchor retained originals for horizontal instead of vertical text
    #[arg(long)]
    horizontal: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();
    let run_start = Instant::now();

    info!("Starting furigloss");
    info!(?args, "Parsed CLI arguments");

    if !args.root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.root_dir.display());
    }

    let overlay_config = OverlayConfig {
        keep_original: args.keep_original,
        writing_mode: if args.horizontal {
            WritingMode::Horizontal
        } else {
            WritingMode::Vertical
        },
    };

    let mut restart_log = RestartLog::load(&args.root_dir).await;
    if args.overwrite_all {
        restart_log.clear();
    } else {
        let dropped = restart_log.verify_completed_files();
        if !dropped.is_empty() {
            info!("Restart log: {} stale entries dropped", dropped.len());
        }
    }

    let discovered = discovery::collect_discovered_files(
        &args.root_dir,
        DiscoveryConfig {
            fail_fast: args.fail_fast,
        },
    )
    .await?;

    let reader = DocumentReader::new(ReaderConfig {
        fail_fast: args.fail_fast,
        ..ReaderConfig::default()
    });

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(discovered.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}",
        )?);
        bar
    };

    let mut run_stats = RunStats::default();

    for file in &discovered {
        progress.inc(1);

        if let Some(ref error) = file.error {
            run_stats.record(FileStats::failed(&file.path, error.clone()));
            continue;
        }

        if !args.overwrite_all
            && (aux_file_exists(&file.path) || restart_log.is_completed(&file.path))
        {
            run_stats.record(FileStats::skipped(&file.path));
            continue;
        }

        let outcome = match reader.read_job(&file.path, &file.parse_path).await {
            Ok(job) => process_job(&job, &overlay_config).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(stats) => {
                restart_log.mark_completed(&file.path);
                run_stats.record(stats);
            }
            Err(e) => {
                if reader.config().fail_fast {
                    restart_log.save(&args.root_dir).await?;
                    return Err(e.context(format!("Failed to annotate {}", file.path.display())));
                }
                warn!("Failed to annotate {}: {:#}", file.path.display(), e);
                run_stats.record(FileStats::failed(&file.path, format!("{e:#}")));
            }
        }
    }

    progress.finish_and_clear();
    restart_log.save(&args.root_dir).await?;

    run_stats.run_duration_ms = run_start.elapsed().as_millis() as u64;
    run_stats.write_json(&args.stats_out).await?;

    println!("furigloss v{} - annotation complete", env!("CARGO_PKG_VERSION"));
    println!(
        "  Annotated: {}, skipped: {}, failed: {}",
        run_stats.files_processed, run_stats.files_skipped, run_stats.files_failed
    );
    println!(
        "  Words emitted: {}, split tokens: {}, missing vocab: {}",
        run_stats.words_emitted, run_stats.split_tokens, run_stats.missing_vocab
    );

    info!(
        "Run completed in {}ms, stats written to {}",
        run_stats.run_duration_ms,
        args.stats_out.display()
    );

    Ok(())
}
