//! load command - Download the selected paths
//!
//! Each path is synced into `<output>/<relative path>`, so the local tree
//! mirrors the `type=/date=/...` layout. Dates are processed in order and
//! the first failure aborts the rest.

use std::path::{Path, PathBuf};

use clap::Args;
use pl_core::{
    Authenticator, ObjectStore as _, PartitionPath, Result, SessionManager, StorageUrl,
    StoreProvider, SyncSummary,
};
use pl_s3::S3ClientCache;
use serde::Serialize;

use super::{Context, DataArgs, fresh_store};
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download objects
#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Local directory to download into
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct LoadOutput {
    status: &'static str,
    paths: Vec<LoadedPath>,
    #[serde(flatten)]
    total: SyncSummary,
    total_size_human: String,
}

#[derive(Debug, Serialize)]
struct LoadedPath {
    source: String,
    target: String,
    #[serde(flatten)]
    summary: SyncSummary,
}

/// Execute the load command
pub async fn execute(args: LoadArgs, formatter: &Formatter, output_config: OutputConfig) -> Result<()> {
    let ctx = Context::load(&args.data.token)?;
    let paths = ctx.resolve_paths(&args.data).await?;
    let output_dir = args
        .output
        .clone()
        .or_else(|| ctx.config.defaults.output.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut clients = S3ClientCache::new(ctx.config.storage.clone());
    let progress = ProgressBar::counter(output_config, paths.len() as u64);
    let loaded = sync_paths(&ctx.session, &mut clients, &paths, &output_dir, &progress).await;
    progress.finish_and_clear();
    let loaded = loaded?;

    let mut total = SyncSummary::default();
    for path in &loaded {
        if path.summary.downloaded == 0 && path.summary.skipped == 0 {
            formatter.warning(&format!("No objects found under {}", path.source));
        }
        total.merge(&path.summary);
    }

    let total_size_human = humansize::format_size(total.bytes, humansize::BINARY);
    if formatter.is_json() {
        formatter.json(&LoadOutput {
            status: "success",
            paths: loaded,
            total,
            total_size_human,
        });
    } else {
        for path in &loaded {
            formatter.println(&format!(
                "{} -> {} ({} downloaded, {} up to date)",
                path.source, path.target, path.summary.downloaded, path.summary.skipped
            ));
        }
        formatter.success(&format!(
            "Downloaded {} file(s), {total_size_human}.",
            total.downloaded
        ));
    }

    Ok(())
}

/// Sync each path into its mirror under `output_dir`
///
/// Credentials are checked before every path and the first failure stops
/// the run.
async fn sync_paths<A, P>(
    session: &SessionManager<A>,
    stores: &mut P,
    paths: &[PartitionPath],
    output_dir: &Path,
    progress: &ProgressBar,
) -> Result<Vec<LoadedPath>>
where
    A: Authenticator,
    P: StoreProvider,
{
    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let url = StorageUrl::parse(&path.absolute)?;
        let target = local_dir(output_dir, path);
        progress.set_message(display_relative(path));

        let store = fresh_store(session, stores).await?;
        let summary = store.sync(&url, &target).await?;
        progress.inc(1);

        tracing::info!(
            source = %path.absolute,
            target = %target.display(),
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            "Synced path"
        );
        loaded.push(LoadedPath {
            source: path.absolute.clone(),
            target: target.display().to_string(),
            summary,
        });
    }
    Ok(loaded)
}

/// Local directory mirroring a partition path
fn local_dir(output_dir: &Path, path: &PartitionPath) -> PathBuf {
    path.relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(output_dir.to_path_buf(), |dir, segment| dir.join(segment))
}

fn display_relative(path: &PartitionPath) -> String {
    if path.relative.is_empty() {
        path.absolute.clone()
    } else {
        path.relative.clone()
    }
}
