//! Share link management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use spaceshare_core::error::AppError;
use spaceshare_core::types::id::{OwnerId, ShareLinkId, SpaceId};
use spaceshare_entity::share::{PolicySummary, ShareLink};
use spaceshare_service::{OwnerContext, ShareRequestBuilder};

use super::wizard;
use crate::output::{self, OutputFormat};

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Acting owner
    #[arg(long, global = true)]
    pub owner: Option<OwnerId>,

    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Create a link with the interactive wizard
    Create {
        /// Space to share
        #[arg(long)]
        space: SpaceId,
    },
    /// List links for a space
    List {
        /// Space to list
        #[arg(long)]
        space: SpaceId,
    },
    /// Revoke a link
    Revoke {
        /// Link ID
        id: ShareLinkId,
    },
    /// Show recent audit events for a link
    Audit {
        /// Link ID
        id: ShareLinkId,
        /// Maximum entries
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

/// Link display row for table output
#[derive(Debug, Serialize, Tabled)]
struct LinkRow {
    id: String,
    label: String,
    level: String,
    status: String,
    views: String,
    expires: String,
    nda: bool,
}

impl From<&ShareLink> for LinkRow {
    fn from(link: &ShareLink) -> Self {
        let views = match link.view_limit {
            Some(limit) => format!("{}/{}", link.view_count, limit),
            None => link.view_count.to_string(),
        };
        Self {
            id: link.id.to_string(),
            label: link.label.clone().unwrap_or_default(),
            level: link.security_level.to_string(),
            status: if link.is_revoked() { "revoked" } else { "active" }.to_string(),
            views,
            expires: link
                .expires_at
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "never".to_string()),
            nda: link.require_nda,
        }
    }
}

/// Audit display row for table output
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    time: String,
    action: String,
    actor: String,
    ip: String,
}

/// Created link summary
#[derive(Debug, Serialize)]
struct CreatedLink {
    id: String,
    url: String,
    #[serde(flatten)]
    policy: PolicySummary,
}

/// Execute share commands
pub async fn execute(
    args: &ShareArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let owner_id = args
        .owner
        .ok_or_else(|| AppError::validation("--owner is required"))?;
    let owner = OwnerContext::new(owner_id, None);

    let config = super::load_config(config_path)?;
    let state = super::build_state(config).await?;

    match &args.command {
        ShareCommand::Create { space } => {
            let mut builder = ShareRequestBuilder::new(
                owner,
                *space,
                state.provisioner.clone(),
                state.issuance.clone(),
            );
            match wizard::run(&mut builder).await? {
                Some(issued) => {
                    output::print_success("Share link created.");
                    output::print_item(
                        &CreatedLink {
                            id: issued.link.id.to_string(),
                            url: issued.url.clone(),
                            policy: PolicySummary::from(&issued.link),
                        },
                        format,
                    );
                }
                None => output::print_warning("Share request cancelled."),
            }
        }
        ShareCommand::List { space } => {
            let links = state.shares.list_for_space(&owner, *space).await?;
            let rows: Vec<LinkRow> = links.iter().map(LinkRow::from).collect();
            output::print_list(&rows, format);
        }
        ShareCommand::Revoke { id } => {
            let link = state.shares.revoke(&owner, *id).await?;
            output::print_success(&format!("Link {} revoked.", link.id));
        }
        ShareCommand::Audit { id, limit } => {
            let link = state.shares.get(&owner, *id).await?;
            let entries = state.stores.audit_log.find_by_link(link.id, *limit).await?;
            let rows: Vec<AuditRow> = entries
                .iter()
                .map(|e| AuditRow {
                    time: e.created_at.to_rfc3339(),
                    action: e.action.clone(),
                    actor: e.actor.clone().unwrap_or_else(|| "-".to_string()),
                    ip: e.ip_address.clone().unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
