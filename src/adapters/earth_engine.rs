use crate::adapters::auth::Session;
use crate::config::{EarthEngineConfig, DEFAULT_PROJECT};
use crate::core::{ExportTask, TaskHandle, TaskSubmitter};
use crate::utils::error::{ExportError, Result};
use reqwest::Client;
use serde::Deserialize;

/// Long-running operation returned when an export is registered.
#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    metadata: Option<OperationMetadata>,
}

#[derive(Debug, Deserialize)]
struct OperationMetadata {
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Submits exports through the Earth Engine REST API (v1).
pub struct EarthEngineClient {
    client: Client,
    base_url: String,
    project: String,
    session: Session,
}

impl EarthEngineClient {
    /// The project comes from configuration first, then the cached
    /// credentials, then the legacy default.
    pub fn new(config: &EarthEngineConfig, session: Session) -> Self {
        let project = config
            .project
            .clone()
            .or_else(|| session.project.clone())
            .unwrap_or_else(|| DEFAULT_PROJECT.to_string());
        tracing::debug!("Submitting exports under project {}", project);

        Self {
            client: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            project,
            session,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn export_url(&self) -> String {
        format!("{}/v1/projects/{}/image:export", self.base_url, self.project)
    }
}

#[async_trait::async_trait]
impl TaskSubmitter for EarthEngineClient {
    async fn submit(&self, task: &ExportTask) -> Result<TaskHandle> {
        let url = self.export_url();
        let request = task.to_request();
        tracing::debug!("POST {} ({})", url, request.description);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.session.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Export response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ExportError::RemoteError {
                status: status.as_u16(),
                message,
            });
        }

        let operation: Operation = response.json().await?;
        Ok(TaskHandle {
            name: operation.name,
            state: operation.metadata.and_then(|m| m.state),
        })
    }
}
