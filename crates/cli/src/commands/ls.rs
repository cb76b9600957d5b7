//! ls command - List objects under the selected paths
//!
//! Credentials are checked before every listing, so a long multi-date run
//! re-authenticates if they expire midway.

use clap::Args;
use pl_core::{
    Authenticator, ObjectInfo, ObjectStore as _, PartitionPath, Result, SessionManager,
    StorageUrl, StoreProvider,
};
use pl_s3::S3ClientCache;
use serde::Serialize;

use super::{Context, DataArgs, fresh_store};
use crate::output::Formatter;

/// List objects
#[derive(Args, Debug)]
pub struct LsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// List recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Summarize output (show totals only)
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    path: String,
    items: Vec<ObjectInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn of(items: &[ObjectInfo]) -> Self {
        let total_size: i64 = items.iter().filter_map(|i| i.size_bytes).sum();
        Self {
            total_objects: items.iter().filter(|i| !i.is_dir).count(),
            total_size_bytes: total_size,
            total_size_human: humansize::format_size(total_size.max(0) as u64, humansize::BINARY),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, formatter: &Formatter) -> Result<()> {
    let ctx = Context::load(&args.data.token)?;
    let paths = ctx.resolve_paths(&args.data).await?;
    let mut clients = S3ClientCache::new(ctx.config.storage.clone());
    let listings = list_paths(&ctx.session, &mut clients, &paths, args.recursive).await?;

    for (path, items) in listings {
        if formatter.is_json() {
            let summary = args.summarize.then(|| Summary::of(&items));
            formatter.json(&LsOutput {
                path,
                items,
                summary,
            });
            continue;
        }

        if paths.len() > 1 {
            formatter.println(&format!("{path}:"));
        }
        if args.summarize {
            let summary = Summary::of(&items);
            formatter.println(&format!(
                "Total: {} objects, {}",
                summary.total_objects, summary.total_size_human
            ));
        } else {
            for item in &items {
                formatter.println(&format_item(item));
            }
        }
    }

    Ok(())
}

/// List each path in order, checking credentials before every listing
async fn list_paths<A, P>(
    session: &SessionManager<A>,
    stores: &mut P,
    paths: &[PartitionPath],
    recursive: bool,
) -> Result<Vec<(String, Vec<ObjectInfo>)>>
where
    A: Authenticator,
    P: StoreProvider,
{
    let mut listings = Vec::with_capacity(paths.len());
    for path in paths {
        let url = StorageUrl::parse(&path.absolute)?;
        let store = fresh_store(session, stores).await?;
        let items = store.list(&url, recursive).await?;
        listings.push((path.absolute.clone(), items));
    }
    Ok(listings)
}

fn format_item(item: &ObjectInfo) -> String {
    let date = item
        .last_modified
        .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "                   ".to_string());

    if item.is_dir {
        format!("[{date}]     0B {}", item.key)
    } else {
        let size = item.size_human.clone().unwrap_or_else(|| "0 B".to_string());
        format!("[{date}] {size:>6} {}", item.key)
    }
}
