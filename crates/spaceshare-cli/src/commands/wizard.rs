//! Interactive terminal front end for the share request builder.

use bytes::Bytes;
use chrono::{Duration, Utc};
use dialoguer::{Confirm, Input, Password, Select};

use spaceshare_core::error::AppError;
use spaceshare_entity::asset::AssetKind;
use spaceshare_entity::share::{IssuedShareLink, SecurityLevel};
use spaceshare_service::share::StagedAsset;
use spaceshare_service::{ShareField, ShareRequestBuilder, WizardStep};

use super::prompt_error;
use crate::output;

const LEVELS: [SecurityLevel; 3] = [
    SecurityLevel::Open,
    SecurityLevel::Password,
    SecurityLevel::Whitelist,
];

/// Walk the owner through every step until the link is issued or the
/// request is cancelled.
pub async fn run(builder: &mut ShareRequestBuilder) -> Result<Option<IssuedShareLink>, AppError> {
    loop {
        match builder.step() {
            WizardStep::Configuring => {
                configure(builder).await?;
                if let Err(e) = builder.advance() {
                    output::print_error(&e.message);
                }
            }
            WizardStep::Branding => {
                brand(builder).await?;
                match choose(&["Next", "Back"])? {
                    0 => {
                        builder.advance()?;
                    }
                    _ => {
                        builder.back()?;
                    }
                }
            }
            WizardStep::Review => {
                review(builder);
                match choose(&["Submit", "Back", "Cancel"])? {
                    0 => match builder.submit().await {
                        Ok(issued) => return Ok(Some(issued)),
                        Err(e) => output::print_error(&e.message),
                    },
                    1 => {
                        builder.back()?;
                    }
                    _ => {
                        builder.cancel().await?;
                        return Ok(None);
                    }
                }
            }
        }
    }
}

async fn configure(builder: &mut ShareRequestBuilder) -> Result<(), AppError> {
    let label = optional_text("Label")?;
    builder.set_field(ShareField::Label(label));

    let current = LEVELS
        .iter()
        .position(|l| *l == builder.draft().level())
        .unwrap_or(0);
    let names: Vec<&str> = LEVELS.iter().map(SecurityLevel::as_str).collect();
    let level = Select::new()
        .with_prompt("Security level")
        .items(&names[..])
        .default(current)
        .interact()
        .map_err(prompt_error)?;
    let level = LEVELS[level];
    builder.set_field(ShareField::SecurityLevel(level));

    if level.requires_password() {
        let password = Password::new()
            .with_prompt("Link password")
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?;
        builder.set_field(ShareField::Password(password));
    }

    if level == SecurityLevel::Whitelist {
        for email in comma_list("Allowed emails (comma separated)")? {
            builder.set_field(ShareField::AddEmail(email));
        }
        for domain in comma_list("Allowed domains (comma separated)")? {
            builder.set_field(ShareField::AddDomain(domain));
        }
    }

    let hours: String = Input::new()
        .with_prompt("Expires in hours (blank for never)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    let expires_at = match hours.trim() {
        "" => None,
        raw => {
            let hours: i64 = raw
                .parse()
                .map_err(|_| AppError::validation(format!("Not a number of hours: {raw}")))?;
            Some(Utc::now() + Duration::hours(hours))
        }
    };
    builder.set_field(ShareField::ExpiresAt(expires_at));

    let limit: String = Input::new()
        .with_prompt("View limit (blank for unlimited)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    let view_limit = match limit.trim() {
        "" => None,
        raw => Some(
            raw.parse()
                .map_err(|_| AppError::validation(format!("Not a view count: {raw}")))?,
        ),
    };
    builder.set_field(ShareField::ViewLimit(view_limit));

    let draft = builder.draft().clone();
    builder.set_field(ShareField::AllowDownloads(confirm(
        "Allow downloads?",
        draft.allow_downloads,
    )?));
    builder.set_field(ShareField::AllowQa(confirm("Allow Q&A?", draft.allow_qa)?));
    builder.set_field(ShareField::EnableWatermark(confirm(
        "Watermark pages?",
        draft.enable_watermark,
    )?));

    let require_nda = confirm("Require an NDA?", draft.require_nda)?;
    builder.set_field(ShareField::RequireNda(require_nda));
    if require_nda && !builder.has_asset(AssetKind::Nda) {
        if let Some(asset) = read_asset("NDA PDF path").await? {
            builder.stage_asset(AssetKind::Nda, asset)?;
        }
    }

    Ok(())
}

async fn brand(builder: &mut ShareRequestBuilder) -> Result<(), AppError> {
    if let Some(asset) = read_asset("Logo image path (blank to skip)").await? {
        builder.stage_asset(AssetKind::Logo, asset)?;
    }
    builder.set_field(ShareField::AccentColor(optional_text(
        "Accent colour (#RGB or #RRGGBB)",
    )?));
    builder.set_field(ShareField::WelcomeMessage(optional_text("Welcome message")?));
    Ok(())
}

fn review(builder: &ShareRequestBuilder) {
    let draft = builder.draft();
    println!();
    output::print_kv("Security level", draft.level().as_str());
    output::print_kv("Label", draft.label.as_deref().unwrap_or("-"));
    if !draft.allowed_emails.is_empty() {
        output::print_kv("Allowed emails", &draft.allowed_emails.join(", "));
    }
    if !draft.allowed_domains.is_empty() {
        output::print_kv("Allowed domains", &draft.allowed_domains.join(", "));
    }
    output::print_kv(
        "Expires",
        &draft
            .expires_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string()),
    );
    output::print_kv(
        "View limit",
        &draft
            .view_limit
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unlimited".to_string()),
    );
    output::print_kv("Downloads", &draft.allow_downloads.to_string());
    output::print_kv("Q&A", &draft.allow_qa.to_string());
    output::print_kv("Watermark", &draft.enable_watermark.to_string());
    output::print_kv("NDA", &draft.require_nda.to_string());
    output::print_kv("Logo", &builder.has_asset(AssetKind::Logo).to_string());
    println!();
}

fn choose(items: &[&str]) -> Result<usize, AppError> {
    Select::new()
        .items(items)
        .default(0)
        .interact()
        .map_err(prompt_error)
}

fn confirm(prompt: &str, default: bool) -> Result<bool, AppError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(prompt_error)
}

fn optional_text(prompt: &str) -> Result<Option<String>, AppError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn comma_list(prompt: &str) -> Result<Vec<String>, AppError> {
    Ok(optional_text(prompt)?
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default())
}

async fn read_asset(prompt: &str) -> Result<Option<StagedAsset>, AppError> {
    let Some(path) = optional_text(prompt)? else {
        return Ok(None);
    };
    let data = tokio::fs::read(&path).await?;
    Ok(Some(StagedAsset {
        content_type: None,
        data: Bytes::from(data),
    }))
}
