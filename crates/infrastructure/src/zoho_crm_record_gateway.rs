use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde_json::{Value, json};
use tracing::{debug, info};
use vatdr_application::{CrmRecordGateway, ProcedureArguments, RecordUpdate};
use vatdr_core::{AppError, AppResult};
use vatdr_domain::{CrmRecord, StagedFile};

const API_PREFIX: &str = "crm/v2";

/// Zoho CRM REST adapter for record, function, attachment and blueprint calls.
pub struct ZohoCrmRecordGateway {
    http_client: reqwest::Client,
    api_base_url: String,
    oauth_token: String,
    blueprint_transition_id: Option<String>,
}

impl ZohoCrmRecordGateway {
    /// Creates a gateway against one Zoho API domain such as `https://www.zohoapis.eu`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        api_base_url: impl Into<String>,
        oauth_token: impl Into<String>,
        blueprint_transition_id: Option<String>,
    ) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_owned(),
            oauth_token: oauth_token.into(),
            blueprint_transition_id: blueprint_transition_id
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.api_base_url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header(
            header::AUTHORIZATION,
            format!("Zoho-oauthtoken {}", self.oauth_token),
        )
    }

    async fn send(&self, builder: reqwest::RequestBuilder, context: &str) -> AppResult<Value> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|error| AppError::Remote(format!("{context} transport error: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(status_error(status, context, body.as_str()));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        response.json::<Value>().await.map_err(|error| {
            AppError::Remote(format!("failed to parse {context} response body: {error}"))
        })
    }
}

#[async_trait]
impl CrmRecordGateway for ZohoCrmRecordGateway {
    async fn fetch_record(&self, entity: &str, record_id: &str) -> AppResult<CrmRecord> {
        let context = format!("fetch {entity} record '{record_id}'");
        let body = self
            .send(
                self.http_client
                    .get(self.endpoint(&format!("{entity}/{record_id}"))),
                context.as_str(),
            )
            .await?;

        CrmRecord::from_payload(first_data_entry(body, context.as_str())?)
    }

    async fn update_record(&self, entity: &str, update: RecordUpdate) -> AppResult<()> {
        let context = format!("update {entity} record '{}'", update.id);
        let body = self
            .send(
                self.http_client
                    .put(self.endpoint(entity))
                    .json(&json!({ "data": [update.to_payload()] })),
                context.as_str(),
            )
            .await?;

        ensure_entry_succeeded(&first_data_entry(body, context.as_str())?, context.as_str())?;
        debug!(entity = %entity, record_id = %update.id, "record updated");
        Ok(())
    }

    async fn invoke_procedure(
        &self,
        name: &str,
        arguments: ProcedureArguments,
    ) -> AppResult<Value> {
        let context = format!("execute function '{name}'");
        self.send(
            self.http_client
                .post(self.endpoint(&format!("functions/{name}/actions/execute")))
                .query(&[
                    ("auth_type", "oauth"),
                    ("arguments", arguments.arguments.as_str()),
                ]),
            context.as_str(),
        )
        .await
    }

    async fn attach_file(
        &self,
        entity: &str,
        record_id: &str,
        file: &StagedFile,
    ) -> AppResult<()> {
        let context = format!("attach '{}' to {entity} record '{record_id}'", file.name());
        // The REST endpoint takes the file as a multipart part, not the base-64 payload.
        let part = reqwest::multipart::Part::bytes(file.raw_bytes().to_vec())
            .file_name(file.name().to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let body = self
            .send(
                self.http_client
                    .post(self.endpoint(&format!("{entity}/{record_id}/Attachments")))
                    .multipart(form),
                context.as_str(),
            )
            .await?;

        ensure_entry_succeeded(&first_data_entry(body, context.as_str())?, context.as_str())?;
        info!(
            entity = %entity,
            record_id = %record_id,
            file_name = %file.name(),
            size_bytes = file.size_bytes(),
            "attachment uploaded"
        );
        Ok(())
    }

    async fn advance_workflow(&self, entity: &str, record_id: &str) -> AppResult<()> {
        let path = format!("{entity}/{record_id}/actions/blueprint");
        let transition_id = match &self.blueprint_transition_id {
            Some(configured) => configured.clone(),
            None => {
                let context = format!("read blueprint of {entity} record '{record_id}'");
                let blueprint = self
                    .send(self.http_client.get(self.endpoint(&path)), context.as_str())
                    .await?;
                first_transition_id(&blueprint, context.as_str())?
            }
        };

        let context = format!("proceed blueprint of {entity} record '{record_id}'");
        let body = self
            .send(
                self.http_client.put(self.endpoint(&path)).json(&json!({
                    "blueprint": [{ "transition_id": transition_id, "data": {} }]
                })),
                context.as_str(),
            )
            .await?;
        if !body.is_null() {
            ensure_entry_succeeded(&body, context.as_str())?;
        }

        info!(
            entity = %entity,
            record_id = %record_id,
            transition_id = %transition_id,
            "blueprint transition proceeded"
        );
        Ok(())
    }
}

fn status_error(status: StatusCode, context: &str, body: &str) -> AppError {
    let message = format!("{context} failed with status {}: {body}", status.as_u16());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        AppError::Remote(message)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AppError::Unauthorized(message)
    } else if status == StatusCode::NOT_FOUND {
        AppError::NotFound(message)
    } else {
        AppError::Validation(message)
    }
}

fn first_data_entry(body: Value, context: &str) -> AppResult<Value> {
    let Value::Object(mut body) = body else {
        return Err(AppError::NotFound(format!("{context} returned no data")));
    };

    match body.remove("data") {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("{context} returned no data"))),
        _ => Err(AppError::NotFound(format!("{context} returned no data"))),
    }
}

// Zoho reports per-record failures inside a 2xx envelope.
fn ensure_entry_succeeded(entry: &Value, context: &str) -> AppResult<()> {
    let status = entry.get("status").and_then(Value::as_str);
    if status.is_some_and(|status| status.eq_ignore_ascii_case("error")) {
        let code = entry
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");
        let message = entry
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        return Err(AppError::Validation(format!(
            "{context} was rejected with {code}: {message}"
        )));
    }

    Ok(())
}

fn first_transition_id(blueprint: &Value, context: &str) -> AppResult<String> {
    blueprint
        .pointer("/blueprint/transitions")
        .and_then(Value::as_array)
        .and_then(|transitions| transitions.first())
        .and_then(|transition| transition.get("id"))
        .and_then(|id| match id {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .ok_or_else(|| AppError::Precondition(format!("{context} reported no transitions")))
}
