//! auth command - Exchange the access token for credentials
//!
//! Prints the temporary credentials as shell `export` lines so they can be
//! `eval`ed and used with other S3 tools.

use clap::Args;
use jiff::Timestamp;
use pl_core::{Credential, Error, Result};
use serde::Serialize;

use super::{Context, TokenArgs};
use crate::output::Formatter;

/// Authenticate and print credentials
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(flatten)]
    pub token: TokenArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthOutput {
    #[serde(flatten)]
    credential: Credential,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
}

/// Execute the auth command
pub async fn execute(args: AuthArgs, formatter: &Formatter) -> Result<()> {
    let ctx = Context::load(&args.token)?;
    if !ctx.session.has_token() {
        return Err(Error::MissingToken);
    }

    let credential = ctx
        .session
        .ensure_valid(Timestamp::now())
        .await?
        .ok_or(Error::MissingToken)?;

    if formatter.is_json() {
        let expires_at = credential.expires_at();
        formatter.json(&AuthOutput {
            credential,
            expires_at,
        });
    } else {
        for line in export_lines(&credential) {
            formatter.println(&line);
        }
    }

    Ok(())
}

fn export_lines(credential: &Credential) -> Vec<String> {
    let mut lines = vec![
        format!("export AWS_ACCESS_KEY_ID={}", credential.access_key_id),
        format!("export AWS_SECRET_ACCESS_KEY={}", credential.secret_access_key),
        format!("export AWS_SESSION_TOKEN={}", credential.session_token),
        format!("export PARTLOAD_BASE_PATH={}", credential.base_path),
    ];
    if let Some(expires_at) = credential.expires_at() {
        lines.push(format!("# expires {expires_at}"));
    }
    lines
}
