//! qsfm command-line client entry point.

mod args;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use qsfm_explorer::{ControllerOptions, EntryAction, Navigation, TransferController, UploadSummary};
use qsfm_protocol::{FileMetadata, RemotePath, User};
use qsfm_remote::HttpRemote;
use qsfm_transfer::{BatchOutcome, BatchReport, LocalFile, UploadEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{ArgParser, Cli, Command, USAGE};
use crate::config::{ClientConfig, Credentials};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let parser = ArgParser::from_env();
    if parser.wants_help() {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::parse(parser) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e:#}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loaded = match &cli.config {
        Some(path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    };
    let mut config = match loaded {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            ClientConfig::default()
        }
    };
    config.apply_env(env_var);
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        server = %config.server_url,
        "starting qsfm"
    );

    let remote = Arc::new(HttpRemote::new(&config.server_url, config.request_timeout())?);

    let credentials = Credentials::resolve(cli.user.clone(), cli.password.clone(), env_var);
    if let Some(creds) = &credentials {
        remote
            .login(&creds.user, &creds.password)
            .await
            .context("sign-in failed")?;
    }

    let result = execute(&cli, &config, &remote).await;

    if credentials.is_some() {
        if let Err(e) = remote.logout().await {
            warn!(error = %e, "sign-out failed");
        }
    }
    result
}

async fn execute(cli: &Cli, config: &ClientConfig, remote: &Arc<HttpRemote>) -> anyhow::Result<()> {
    if cli.command == Command::Whoami {
        let user = remote.me().await?;
        print_user(&user);
        return Ok(());
    }

    let options = ControllerOptions {
        root: RemotePath::new(&config.root_path),
        policy: config.upload_policy(),
        last_dir: config.last_dir_store(),
    };
    let (tx, rx) = mpsc::channel(64);
    let controller = TransferController::new(remote.clone(), options).with_events(tx);
    let progress = tokio::spawn(report_progress(rx));

    let result = dispatch(cli, &controller, remote).await;

    // Closing the controller closes the event channel.
    drop(controller);
    let _ = progress.await;
    result
}

async fn dispatch(
    cli: &Cli,
    controller: &TransferController,
    remote: &HttpRemote,
) -> anyhow::Result<()> {
    match &cli.command {
        Command::Ls { path } => {
            let nav = match path {
                Some(p) => controller.navigate_to(p.as_str()).await?,
                None => controller.load_current().await?,
            };
            print_navigation(&nav);
        }
        Command::Cd { name } => {
            let entry = find_entry(controller, name).await?;
            match controller.open_entry(name, entry.is_dir).await? {
                EntryAction::Entered(nav) => print_navigation(&nav),
                EntryAction::ShowDetails(path) => {
                    let meta = controller.file_details(&path).await?;
                    print_metadata(&path, &meta);
                }
            }
        }
        Command::Up { index } => {
            let nav = controller.jump_to_ancestor(*index).await?;
            print_navigation(&nav);
        }
        Command::Stat { name } => {
            let path = controller.cwd().join(name);
            let meta = controller.file_details(&path).await?;
            print_metadata(&path, &meta);
        }
        Command::Mkdir { name } => {
            let nav = controller.create_folder(name).await?;
            print_navigation(&nav);
        }
        Command::Upload { files } => {
            let mut local = Vec::with_capacity(files.len());
            for file in files {
                local.push(
                    LocalFile::from_path(file)
                        .with_context(|| format!("cannot read {}", file.display()))?,
                );
            }
            upload(controller, local, cli.retries).await?;
        }
        Command::Download { name, dest } => {
            let entry = find_entry(controller, name).await?;
            if entry.is_dir {
                bail!("{name} is a directory");
            }
            controller.clear_selection();
            controller.toggle_selection(name, false);
            let Some(target) = controller.download_target() else {
                bail!("nothing to download");
            };
            info!(url = %target.url, "downloading");
            let bytes = remote.download_to(target.path.as_str(), dest).await?;
            println!("{} -> {} ({})", target.path, dest.display(), format_size(bytes));
        }
        Command::Whoami => {}
    }
    Ok(())
}

async fn find_entry(controller: &TransferController, name: &str) -> anyhow::Result<FileMetadata> {
    let nav = controller.load_current().await?;
    nav.listing()
        .and_then(|listing| listing.find(name).cloned())
        .with_context(|| format!("no entry named {name} in {}", controller.cwd()))
}

async fn upload(
    controller: &TransferController,
    files: Vec<LocalFile>,
    retries: u32,
) -> anyhow::Result<()> {
    let selection = controller.stage_files(files).await;
    for rejected in &selection.rejected {
        println!("skipped {} ({})", rejected.name, rejected.reason);
    }

    let Some(mut report) = finished(controller.upload_staged().await) else {
        println!("nothing to upload");
        return Ok(());
    };
    for attempt in 1..=retries {
        if report.is_success() {
            break;
        }
        info!(attempt, "resuming failed uploads");
        if let Some(resumed) = finished(controller.resume_failed().await) {
            report.absorb(resumed);
        }
    }

    for path in &report.completed {
        println!("uploaded {path}");
    }
    for failed in &report.failed {
        println!(
            "failed {} at {}/{}: {}",
            failed.path, failed.offset, failed.total_size, failed.error
        );
    }
    if !report.is_success() {
        bail!("{} upload(s) failed", report.failed.len());
    }
    Ok(())
}

/// The batch report of a run, logging a failed listing refresh.
fn finished(summary: UploadSummary) -> Option<BatchReport> {
    if let Some(Err(e)) = &summary.refresh {
        warn!(error = %e, "listing refresh after upload failed");
    }
    match summary.outcome {
        BatchOutcome::NothingToUpload => None,
        BatchOutcome::Finished(report) => Some(report),
    }
}

async fn report_progress(mut rx: mpsc::Receiver<UploadEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            UploadEvent::ChunkSent {
                path,
                offset,
                total,
            } => {
                let pct = if total == 0 {
                    100.0
                } else {
                    offset as f64 / total as f64 * 100.0
                };
                eprintln!("  {path}: {pct:.1}%");
            }
            UploadEvent::Completed { path } => eprintln!("  {path}: done"),
            UploadEvent::Failed {
                path,
                offset,
                error,
            } => eprintln!("  {path}: failed at byte {offset}: {error}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_navigation(nav: &Navigation) {
    let Some(listing) = nav.listing() else {
        return;
    };
    println!("{}", listing.cwd);
    if listing.entries.is_empty() {
        println!("  (empty)");
        return;
    }
    for entry in listing.directories().chain(listing.files()) {
        let kind = if entry.is_dir { "d" } else { "-" };
        let size = if entry.is_dir {
            String::new()
        } else {
            format_size(entry.size)
        };
        println!(
            "  {kind} {:>10}  {}  {}",
            size,
            entry.mod_time.format("%Y-%m-%d %H:%M"),
            entry.name
        );
    }
}

fn print_metadata(path: &RemotePath, meta: &FileMetadata) {
    println!("path:     {path}");
    println!("size:     {} ({} bytes)", format_size(meta.size), meta.size);
    println!("modified: {}", meta.mod_time.to_rfc3339());
    println!("type:     {}", if meta.is_dir { "directory" } else { "file" });
    if !meta.sha1.is_empty() {
        println!("sha1:     {}", meta.sha1);
    }
}

fn print_user(user: &User) {
    println!("{} ({}, role {})", user.name, user.id, user.role);
    let limit = user.quota.as_ref().map(|q| q.space_limit).unwrap_or(0);
    if limit > 0 {
        println!(
            "storage: {} / {}",
            format_size(user.used_space.max(0) as u64),
            format_size(limit as u64)
        );
    } else {
        println!("storage: {} used", format_size(user.used_space.max(0) as u64));
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
