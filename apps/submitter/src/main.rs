//! Headless runner for the VAT de-registration submission widget.

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;
use vatdr_application::{
    AccountUpdateStrategy, StagingOutcome, SubmissionWidget, SubmitAttempt, WidgetSettings,
};
use vatdr_core::{AppError, AppResult};
use vatdr_domain::{PageLoadEvent, SubmissionOutcome};
use vatdr_infrastructure::{LocalFileReader, PresetWidgetSurface, ZohoCrmRecordGateway};

#[derive(Debug, Clone)]
struct SubmitterConfig {
    api_base_url: String,
    oauth_token: String,
    blueprint_transition_id: Option<String>,
    http_timeout_seconds: u64,
    settings: WidgetSettings,
    record_id: String,
    file_path: PathBuf,
    effective_date: Option<String>,
    reason: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = SubmitterConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let layout = config.settings.layout.clone();
    let mut preset_fields = Vec::new();
    if let Some(date) = config.effective_date.clone() {
        preset_fields.push((layout.date_field.clone(), date));
    }
    if let Some(reason) = config.reason.clone() {
        preset_fields.push((layout.reason_field.clone(), reason));
    }

    let gateway = Arc::new(ZohoCrmRecordGateway::new(
        http_client,
        config.api_base_url.as_str(),
        config.oauth_token.as_str(),
        config.blueprint_transition_id.clone(),
    ));
    let surface = Arc::new(PresetWidgetSurface::new(preset_fields));
    let reader = Arc::new(LocalFileReader::new());
    let widget = SubmissionWidget::new(
        gateway,
        surface.clone(),
        reader.clone(),
        config.settings.clone(),
    )?;

    info!(
        api_base_url = %config.api_base_url,
        record_id = %config.record_id,
        strategy = config.settings.account_update_strategy.as_str(),
        max_upload_bytes = config.settings.max_upload_bytes,
        "vatdr-submitter started"
    );

    widget
        .on_page_load(&PageLoadEvent {
            entity_id: config.record_id.clone(),
        })
        .await;

    let selection = reader.describe(&config.file_path).await?;
    match widget.on_file_selected(Some(&selection)).await {
        StagingOutcome::Staged { name, size_bytes } => {
            info!(file_name = %name, size_bytes, "certificate staged");
        }
        outcome => {
            warn!(outcome = ?outcome, "certificate was not staged");
        }
    }

    match widget.on_submit().await {
        SubmitAttempt::Completed(SubmissionOutcome::Success) => {
            info!(record_id = %config.record_id, "submission completed");
            Ok(())
        }
        SubmitAttempt::Completed(SubmissionOutcome::Failure { stage, reason }) => {
            error!(stage = stage.as_str(), reason = %reason, "submission failed");
            Err(AppError::Remote(format!(
                "submission failed while {}: {reason}",
                stage.as_str()
            )))
        }
        SubmitAttempt::Rejected(report) => {
            let messages = report
                .errors()
                .iter()
                .map(|error| error.message().to_owned())
                .collect::<Vec<_>>();
            Err(AppError::Validation(format!(
                "submission rejected: {}",
                messages.join(" ")
            )))
        }
        SubmitAttempt::Ignored => Err(AppError::Internal(
            "submission already in flight".to_owned(),
        )),
    }
}

impl SubmitterConfig {
    fn load() -> AppResult<Self> {
        let api_base_url = parse_api_base_url(
            optional_env("ZOHO_API_BASE_URL")
                .unwrap_or_else(|| "https://www.zohoapis.com".to_owned())
                .as_str(),
        )?;
        let oauth_token = required_env("ZOHO_OAUTH_TOKEN")?;
        let blueprint_transition_id = optional_env("ZOHO_BLUEPRINT_TRANSITION_ID");
        let http_timeout_seconds = parse_u64(
            "ZOHO_HTTP_TIMEOUT_SECONDS",
            optional_env("ZOHO_HTTP_TIMEOUT_SECONDS"),
            30,
        )?;

        if http_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "ZOHO_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            oauth_token,
            blueprint_transition_id,
            http_timeout_seconds,
            settings: widget_settings(optional_env)?,
            record_id: required_env("SUBMIT_RECORD_ID")?,
            file_path: PathBuf::from(required_env("SUBMIT_FILE_PATH")?),
            effective_date: optional_env("SUBMIT_EFFECTIVE_DATE"),
            reason: optional_env("SUBMIT_REASON"),
        })
    }
}

/// Applies `WIDGET_*` overrides from `lookup` to the deployment defaults.
fn widget_settings(lookup: impl Fn(&str) -> Option<String>) -> AppResult<WidgetSettings> {
    let mut settings = WidgetSettings::vat_deregistration()?;
    settings.max_upload_bytes = parse_u64(
        "WIDGET_MAX_UPLOAD_BYTES",
        lookup("WIDGET_MAX_UPLOAD_BYTES"),
        settings.max_upload_bytes,
    )?;
    settings.staging_delay_ms = parse_u64(
        "WIDGET_STAGING_DELAY_MS",
        lookup("WIDGET_STAGING_DELAY_MS"),
        settings.staging_delay_ms,
    )?;
    if let Some(procedure) = lookup("WIDGET_ACCOUNT_PROCEDURE") {
        settings.account_procedure_name = procedure;
    }
    if let Some(strategy) = lookup("WIDGET_ACCOUNT_UPDATE_STRATEGY") {
        settings.account_update_strategy = strategy.parse::<AccountUpdateStrategy>()?;
    }
    if let Some(entity) = lookup("WIDGET_APPLICATION_ENTITY") {
        settings.records.application_entity = entity;
    }

    if settings.max_upload_bytes == 0 {
        return Err(AppError::Validation(
            "WIDGET_MAX_UPLOAD_BYTES must be greater than zero".to_owned(),
        ));
    }

    Ok(settings)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_api_base_url(value: &str) -> AppResult<String> {
    let url = Url::parse(value.trim()).map_err(|error| {
        AppError::Validation(format!("invalid ZOHO_API_BASE_URL value '{value}': {error}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "ZOHO_API_BASE_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn required_env(name: &str) -> AppResult<String> {
    optional_env(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_u64(name: &str, value: Option<String>, default: u64) -> AppResult<u64> {
    match value {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
