//! CLI binary for mdimg-migrate.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `MigrationConfig`, picks a backend, and prints per-document results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mdimg_migrate::{
    backend::{auth, DriveFolderUploader, PhotosAlbumUploader},
    collect_markdown_files, ensure_staging_dir, migrate_document,
    pipeline::{extract, fetch, name},
    BatchReport, DialectSet, DocumentOutcome, MigrationConfig, Uploader,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Migrate one post to a Drive folder
  mdimg --credentials creds.json --root-folder 1AbC... content/posts/hello.md

  # Migrate every post under a directory
  mdimg --credentials creds.json --root-folder 1AbC... --dir content/posts

  # HackMD export: bare imgur links instead of image markup
  mdimg --credentials creds.json --root-folder 1AbC... --hackmd export.md

  # Legacy Photos-album destination
  mdimg --credentials creds.json --backend photos old-post.md

  # See what would be migrated, no credentials needed
  mdimg --dry-run content/posts/hello.md

  # JSON report for scripting
  mdimg --credentials creds.json --root-folder 1AbC... --json --dir content > report.json

CREDENTIALS:
  The credentials file is an opaque token cache: JSON with an
  "access_token" field, or a bare token on one line. Obtaining and
  refreshing tokens is up to you (gcloud, oauth2l, a browser flow, ...);
  mdimg only reads the result.

STAGING:
  Downloaded assets are kept in the staging directory (default: tmp/)
  after the run. Re-running skips any asset that is already staged, so a
  failed batch can be restarted cheaply. Delete the directory to force
  clean re-downloads.
"#;

/// Migrate Markdown image links to Google Drive or Google Photos.
#[derive(Parser, Debug)]
#[command(
    name = "mdimg",
    version,
    about = "Migrate Markdown image links to Google Drive or Google Photos",
    long_about = "Download every image referenced by the given Markdown files, upload them to a \
Google Drive folder (or, legacy, a Google Photos album), and rewrite the Markdown so the links \
point at the new locations. Files are processed strictly one at a time; a failure in one file \
does not stop the batch.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown files to process.
    files: Vec<PathBuf>,

    /// Also process every *.md file under this directory (recursive).
    #[arg(short = 'r', long, env = "MDIMG_DIR")]
    dir: Option<PathBuf>,

    /// Path to the credentials/token-cache file.
    #[arg(short, long, env = "MDIMG_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Destination backend.
    #[arg(long, env = "MDIMG_BACKEND", value_enum, default_value = "drive")]
    backend: BackendArg,

    /// Drive folder ID the per-document folders are created under.
    #[arg(long, env = "MDIMG_ROOT_FOLDER")]
    root_folder: Option<String>,

    /// Override the per-document container name (folder/album).
    #[arg(long, env = "MDIMG_CONTAINER")]
    container: Option<String>,

    /// HackMD mode: extract bare imgur links instead of image markup.
    #[arg(long, env = "MDIMG_HACKMD")]
    hackmd: bool,

    /// Directory where downloaded assets are staged.
    #[arg(long, env = "MDIMG_STAGING_DIR", default_value = "tmp")]
    staging_dir: PathBuf,

    /// Re-fetch assets even when a staged file already exists.
    #[arg(long, env = "MDIMG_FORCE_FETCH")]
    force_fetch: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "MDIMG_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Extract and name references, print them, and exit. No network.
    #[arg(long)]
    dry_run: bool,

    /// Output a structured JSON report instead of text.
    #[arg(long, env = "MDIMG_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "MDIMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MDIMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MDIMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Drive,
    Photos,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Collect files ────────────────────────────────────────────────────
    let mut files = cli.files.clone();
    if let Some(ref dir) = cli.dir {
        files.extend(collect_markdown_files(dir).context("Failed to scan directory")?);
    }
    if files.is_empty() {
        anyhow::bail!("No Markdown files to process (give file paths or --dir)");
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = MigrationConfig::builder()
        .staging_dir(cli.staging_dir.clone())
        .skip_staged(!cli.force_fetch)
        .download_timeout_secs(cli.download_timeout)
        .dialects(if cli.hackmd {
            DialectSet::HackMd
        } else {
            DialectSet::Standard
        });
    if let Some(ref container) = cli.container {
        builder = builder.container_name(container.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Dry-run mode ─────────────────────────────────────────────────────
    if cli.dry_run {
        return dry_run(&files, &config);
    }

    // ── Build the backend ────────────────────────────────────────────────
    let credentials = cli
        .credentials
        .as_deref()
        .context("--credentials is required (except with --dry-run)")?;
    let token = auth::load_access_token(credentials)?;
    let client = reqwest::Client::new();
    let uploader: Box<dyn Uploader> = match cli.backend {
        BackendArg::Drive => {
            let root = cli.root_folder.clone().context(
                "--root-folder (or MDIMG_ROOT_FOLDER) is required for the drive backend",
            )?;
            Box::new(DriveFolderUploader::new(client, token, root))
        }
        BackendArg::Photos => Box::new(PhotosAlbumUploader::new(client, token)),
    };

    ensure_staging_dir(&config)?;
    // One download client for the whole run, built with the configured
    // timeout; the backend client above has its own defaults.
    let fetch_client = fetch::build_client(config.download_timeout_secs)?;

    // ── Run the batch ────────────────────────────────────────────────────
    // The loop lives here rather than in `migrate_batch` so the bar can
    // print a line per document as it completes.
    let bar = if show_progress {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Migrating");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let start = Instant::now();
    let mut report = BatchReport::default();
    for path in &files {
        let result = migrate_document(path, uploader.as_ref(), &fetch_client, &config).await;
        if let Some(ref bar) = bar {
            match &result {
                Ok(doc) => bar.println(format_doc_line(doc.outcome, path, doc.replaced, doc.warnings.len())),
                Err(e) => bar.println(format!("  {} {}  {}", red("✗"), path.display(), red(&e.to_string()))),
            }
            bar.inc(1);
        }
        match result {
            Ok(doc) => report.documents.push(doc),
            Err(e) => report.failures.push((path.clone(), e.to_string())),
        }
    }
    report.total_duration_ms = start.elapsed().as_millis() as u64;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        let migrated = report.migrated_count();
        let skipped = report.skipped_count();
        let failed = report.failures.len();
        eprintln!(
            "{} {} migrated  {} skipped  {}  {}",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&migrated.to_string()),
            dim(&skipped.to_string()),
            if failed == 0 {
                dim("0 failed")
            } else {
                red(&format!("{failed} failed"))
            },
            dim(&format!("{}ms", report.total_duration_ms)),
        );
        for (path, error) in &report.failures {
            eprintln!("  {} {}: {error}", red("✗"), path.display());
        }
    }

    if report.documents.is_empty() && !report.failures.is_empty() {
        anyhow::bail!("Every document failed");
    }
    Ok(())
}

fn format_doc_line(outcome: DocumentOutcome, path: &Path, replaced: usize, warnings: usize) -> String {
    match outcome {
        DocumentOutcome::Migrated => format!(
            "  {} {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{replaced} link(s) rewritten"))
        ),
        DocumentOutcome::PartiallyMigrated => format!(
            "  {} {}  {}",
            cyan("⚠"),
            path.display(),
            dim(&format!("{replaced} rewritten, {warnings} left untouched"))
        ),
        DocumentOutcome::Skipped => {
            format!("  {} {}  {}", dim("·"), path.display(), dim("no images"))
        }
    }
}

/// Print what extraction and naming would do, without touching anything.
fn dry_run(files: &[PathBuf], config: &MigrationConfig) -> Result<()> {
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let mut refs = extract::extract_references(&text, &stem, config);
        name::assign_local_names(&mut refs, &stem);

        println!("{} ({} reference(s))", bold(&path.display().to_string()), refs.len());
        for r in &refs {
            println!("  {}  {}", r.local_name, dim(&r.source_url));
            if r.source_url != r.old_literal {
                println!("      {} {}", dim("from"), dim(&r.old_literal));
            }
        }
    }
    Ok(())
}
