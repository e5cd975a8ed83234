use crate::config::AppConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "aod-export")]
#[command(about = "Submit annual mean AOD export tasks to Earth Engine")]
pub struct CliArgs {
    /// Path to TOML configuration file; built-in defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// First year to export (inclusive)
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year to export (inclusive)
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Cloud project that owns the export tasks
    #[arg(long)]
    pub project: Option<String>,

    /// Cached OAuth credentials file
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Build and print the requests without contacting the platform
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl CliArgs {
    /// 應用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(year) = self.start_year {
            tracing::info!("🔧 start_year overridden to: {}", year);
            config.export.start_year = year;
        }
        if let Some(year) = self.end_year {
            tracing::info!("🔧 end_year overridden to: {}", year);
            config.export.end_year = year;
        }
        if let Some(project) = &self.project {
            config.earth_engine.project = Some(project.clone());
        }
        if let Some(path) = &self.credentials {
            config.earth_engine.credentials_path = Some(path.clone());
        }
    }
}
