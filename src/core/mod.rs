pub mod export;
pub mod orchestrator;
pub mod qa_mask;

pub use crate::domain::expression::Expr;
pub use crate::domain::model::{ExportTask, SubmittedTask, TaskHandle, TaskParams};
pub use crate::domain::ports::{Authenticator, TaskSubmitter};
pub use crate::utils::error::Result;
