use crate::core::{ExportTask, TaskHandle, TaskSubmitter};
use crate::utils::error::Result;

/// Builds each request and logs it instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct DryRunSubmitter;

#[async_trait::async_trait]
impl TaskSubmitter for DryRunSubmitter {
    async fn submit(&self, task: &ExportTask) -> Result<TaskHandle> {
        let request = task.to_request();
        tracing::info!(
            "🔍 DRY RUN: would export '{}' to {}/{}.tif ({} nodes in expression)",
            request.description,
            request.file_export_options.drive_destination.folder,
            request.file_export_options.drive_destination.filename_prefix,
            request.expression.values.len()
        );
        tracing::debug!("{}", serde_json::to_string_pretty(&request)?);

        Ok(TaskHandle {
            name: format!("dry-run/{}", request.description),
            state: Some("DRY_RUN".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;

    #[tokio::test]
    async fn test_dry_run_returns_synthetic_handle() {
        let task = ExportTask::build(2020, &ExportConfig::default()).unwrap();
        let handle = DryRunSubmitter.submit(&task).await.unwrap();
        assert_eq!(handle.id(), "Annual_Mean_AOD_2020_USA");
        assert_eq!(handle.state.as_deref(), Some("DRY_RUN"));
    }
}
