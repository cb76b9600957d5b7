//! paths command - Print the selected storage paths
//!
//! Needs no network access when the bucket and account id are given.

use clap::Args;
use pl_core::{PartitionPath, Result};
use serde::Serialize;

use super::{Context, DataArgs};
use crate::output::Formatter;

/// Print storage paths
#[derive(Args, Debug)]
pub struct PathsArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Serialize)]
struct PathsOutput {
    paths: Vec<PartitionPath>,
}

/// Execute the paths command
pub async fn execute(args: PathsArgs, formatter: &Formatter) -> Result<()> {
    let ctx = Context::load(&args.data.token)?;
    let paths = ctx.resolve_paths(&args.data).await?;

    if formatter.is_json() {
        formatter.json(&PathsOutput { paths });
    } else {
        for path in &paths {
            formatter.println(&path.absolute);
        }
    }

    Ok(())
}
