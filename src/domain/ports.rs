use crate::domain::model::{ExportTask, TaskHandle};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Registers an export with the remote platform. Returns once the platform
/// acknowledges the task; the export itself runs remotely.
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    async fn submit(&self, task: &ExportTask) -> Result<TaskHandle>;
}

/// Interactive credential flow, run when no usable cached session exists.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<()>;
}
