pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, LogFormat};

pub use adapters::auth::{connect, InteractiveAuthenticator, OAuthClient, Session, StoredCredentials};
pub use adapters::dry_run::DryRunSubmitter;
pub use adapters::earth_engine::EarthEngineClient;
pub use config::{AppConfig, Boundary, EarthEngineConfig, ExportConfig};
pub use crate::core::{export::plan_tasks, orchestrator::ExportEngine};
pub use utils::error::{ExportError, Result};
