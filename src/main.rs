//! # Primer CLI Application
//!
//! Command-line front end for the lesson ingestion pipeline.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands:
//!   - `ingest`: Import the tutorial into the lesson database
//!   - `toc`: Preview the modules and lessons the table of contents lists
//!   - `list`: Inspect the lesson database
//!
//! Ctrl-C cancels a running ingest at its next request delay.

mod logging;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use primer::config::IngestConfig;
use primer::fetch::Fetcher;
use primer::pipeline::{Pipeline, Progress, cancel_pair, discover_modules};
use primer::profile::SiteProfile;
use primer::store::Database;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Import a programming tutorial into a structured lesson database", long_about = None)]
struct Cli {
    /// Also write logs to primer.log in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, rewrite and store every lesson
    Ingest(IngestArgs),

    /// Show the modules and lessons found in the table of contents
    Toc(TocArgs),

    /// List stored modules and lessons
    List(ListArgs),
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Site profile JSON file (default: built-in METANIT Go profile)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Base URL of the tutorial site
    #[arg(long)]
    base_url: Option<String>,

    /// Path of the table of contents page
    #[arg(long)]
    toc_path: Option<String>,
}

#[derive(Args, Debug)]
struct IngestArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Maximum number of lessons to ingest, 0 or less for all
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    limit: i64,

    /// Database path
    #[arg(long, default_value = "primer.db")]
    database: PathBuf,

    /// Delay before each lesson fetch in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct TocArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Maximum number of lessons to show, 0 or less for all
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    limit: i64,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Show sections and tasks of every lesson
    #[arg(short, long)]
    details: bool,

    /// Database path
    #[arg(long, default_value = "primer.db")]
    database: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::setup_logging(cli.log_dir.as_deref())?;

    match cli.command {
        Some(Commands::Ingest(args)) => {
            ingest_command(args).await?;
        }
        Some(Commands::Toc(args)) => {
            toc_command(args).await?;
        }
        Some(Commands::List(args)) => {
            list_command(args).await?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["primer", "--help"]);
        }
    }

    Ok(())
}

fn load_site(args: &SiteArgs) -> anyhow::Result<(SiteProfile, IngestConfig)> {
    let profile = match &args.profile {
        Some(path) => SiteProfile::from_json_file(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => SiteProfile::metanit_go(),
    };

    let mut builder = IngestConfig::builder();
    if let Some(base_url) = &args.base_url {
        builder = builder.base_url(base_url.clone());
    }
    if let Some(toc_path) = &args.toc_path {
        builder = builder.toc_path(toc_path.clone());
    }

    Ok((profile, builder.build()))
}

fn limit_from(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[instrument]
async fn ingest_command(args: IngestArgs) -> anyhow::Result<()> {
    let (profile, mut config) = load_site(&args.site)?;
    if let Some(delay_ms) = args.delay_ms {
        config.request_delay_ms = delay_ms;
    }

    let db = Database::new_from_path(&path_str(&args.database)).await?;
    println!(
        "Ingesting {}{} into {}",
        config.base_url,
        config.toc_path,
        args.database.display()
    );

    let mut pipeline = Pipeline::new(config, profile, db)?;

    // Render progress updates while the run is going
    let progress_handle = if args.quiet {
        None
    } else {
        let (progress_sender, mut progress_receiver) = mpsc::channel(100);
        pipeline = pipeline.with_progress(progress_sender);

        let progress_bar = ProgressBar::new(0);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
                .progress_chars("##-"),
        );
        progress_bar.set_message("Fetching table of contents...");

        Some(tokio::spawn(async move {
            while let Some(progress) = progress_receiver.recv().await {
                match progress {
                    Progress::Started { total } => progress_bar.set_length(total as u64),
                    Progress::Saved { title } => {
                        progress_bar.inc(1);
                        progress_bar.set_message(format!("Saved {}", title));
                    }
                    Progress::Skipped { url } => {
                        progress_bar.inc(1);
                        progress_bar.set_message(format!("Skipped {}", url));
                    }
                }
            }
            progress_bar.finish_and_clear();
        }))
    };

    let (cancel_handle, cancel_token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            cancel_handle.cancel();
        }
    });

    let start_time = std::time::Instant::now();
    let result = pipeline.run(&cancel_token, limit_from(args.limit)).await;

    // Dropping the pipeline closes the progress channel
    drop(pipeline);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    match result {
        Ok(summary) => {
            println!("Ingestion completed in {:.2?}", start_time.elapsed());
            println!("{}", summary);
            Ok(())
        }
        Err(primer::Error::Cancelled) => {
            warn!("Ingestion cancelled; lessons saved so far are kept");
            println!("Ingestion cancelled after {:.2?}", start_time.elapsed());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument]
async fn toc_command(args: TocArgs) -> anyhow::Result<()> {
    let (profile, config) = load_site(&args.site)?;
    let fetcher = Fetcher::new(&config)?;

    let groups =
        discover_modules(&fetcher, &config.toc_path, &profile, limit_from(args.limit)).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    let total: usize = groups.iter().map(|group| group.entries.len()).sum();
    println!("Found {} lessons in {} modules", total, groups.len());
    for group in groups {
        println!();
        println!("{}. {} [{}]", group.order_index, group.title, group.slug);
        for entry in group.entries {
            println!("   {:>3}. {} ({})", entry.order_index, entry.title, entry.url);
        }
    }

    Ok(())
}

#[instrument]
async fn list_command(args: ListArgs) -> anyhow::Result<()> {
    let db = Database::new_from_path(&path_str(&args.database)).await?;

    let modules = db.list_modules().await?;
    println!("Stored modules: {}", modules.len());

    for module in modules {
        let lessons = db.list_lessons(module.id).await?;
        println!();
        println!(
            "{}. {} [{}] - {} lessons",
            module.order_index,
            module.title,
            module.slug,
            lessons.len()
        );

        for lesson in lessons {
            println!(
                "   {:>3}. {} ({} min) {}",
                lesson.order_index, lesson.title, lesson.reading_time_min, lesson.source_url
            );

            if args.details {
                let sections = db.get_sections(lesson.id).await?;
                let tasks = db.get_tasks(lesson.id).await?;
                let kinds: Vec<_> = sections.iter().map(|s| s.kind.as_str()).collect();
                println!("        Sections: {}", kinds.join(", "));
                println!(
                    "        Tasks: {} ({} points)",
                    tasks.len(),
                    tasks.iter().map(|t| t.points).sum::<u32>()
                );
            }
        }
    }

    Ok(())
}
