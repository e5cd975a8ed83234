use crate::config::ExportConfig;
use crate::core::export::plan_tasks;
use crate::core::TaskSubmitter;
use crate::domain::model::SubmittedTask;
use crate::utils::error::Result;
use std::time::Instant;

pub struct ExportEngine<S: TaskSubmitter> {
    submitter: S,
    config: ExportConfig,
}

impl<S: TaskSubmitter> ExportEngine<S> {
    pub fn new(submitter: S, config: ExportConfig) -> Self {
        Self { submitter, config }
    }

    /// Submits one export per configured year, in ascending order.
    ///
    /// Each call returns once the platform has registered the task. The first
    /// failure aborts the run; tasks registered before it keep running remotely.
    pub async fn run(&self) -> Result<Vec<SubmittedTask>> {
        println!("--- Exporting yearly AOD data ---");

        let tasks = plan_tasks(&self.config)?;
        tracing::debug!(
            "Planned {} export tasks for {}..={}",
            tasks.len(),
            self.config.start_year,
            self.config.end_year
        );

        let mut submitted = Vec::with_capacity(tasks.len());
        for task in tasks {
            let year = task.params.year;
            let started = Instant::now();
            println!("Submitting export task for year: {}...", year);

            let handle = self.submitter.submit(&task).await?;
            let elapsed = started.elapsed();

            println!(
                "  - Task for year {} submitted in {:.2} seconds.",
                year,
                elapsed.as_secs_f64()
            );
            tracing::info!(
                year,
                task_id = handle.id(),
                state = handle.state.as_deref().unwrap_or("UNKNOWN"),
                "Export task registered"
            );

            submitted.push(SubmittedTask {
                year,
                description: task.params.description,
                handle,
                elapsed,
            });
        }

        println!("\n--- All export tasks have been submitted. ---");
        println!("Track progress in the 'Tasks' tab of the Earth Engine Code Editor");
        println!("(code.earthengine.google.com); finished files appear in the");
        println!("'{}' folder of your Google Drive.", self.config.drive_folder);

        Ok(submitted)
    }
}
