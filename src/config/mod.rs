#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub export: ExportConfig,
    pub earth_engine: EarthEngineConfig,
}

/// What to export. Built once and passed by reference to everything that
/// plans or submits tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub collection_id: String,
    pub aod_band: String,
    pub qa_band: String,
    /// Multiplier from stored integers to optical depth.
    pub scale_factor: f64,
    /// Export resolution in meters.
    pub export_scale: f64,
    pub crs: String,
    pub max_pixels: u64,
    pub boundary: Boundary,
    pub region_tag: String,
    pub drive_folder: String,
    pub file_prefix: String,
    pub description_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            start_year: 2015,
            end_year: 2024,
            collection_id: "MODIS/061/MCD19A2_GRANULES".to_string(),
            aod_band: "Optical_Depth_055".to_string(),
            qa_band: "AOD_QA".to_string(),
            scale_factor: 0.001,
            export_scale: 1000.0,
            crs: "EPSG:4326".to_string(),
            max_pixels: 10_000_000_000_000,
            boundary: Boundary::default(),
            region_tag: "USA".to_string(),
            drive_folder: "GEE_Exports".to_string(),
            file_prefix: "AOD".to_string(),
            description_prefix: "Annual_Mean_AOD".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start_year..=self.end_year
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Boundary {
    /// Features of a table whose `property` equals `value`, dissolved into one geometry.
    Table {
        table_id: String,
        property: String,
        value: String,
    },
    /// Inline polygon rings of `[lon, lat]` pairs.
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Default for Boundary {
    fn default() -> Self {
        Self::Table {
            table_id: "USDOS/LSIB_SIMPLE/2017".to_string(),
            property: "country_na".to_string(),
            value: "United States".to_string(),
        }
    }
}

/// Project used when neither configuration nor cached credentials name one.
pub const DEFAULT_PROJECT: &str = "earthengine-legacy";

/// Where and how to reach the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthEngineConfig {
    pub api_base_url: String,
    /// Overrides the project stored with the cached credentials.
    pub project: Option<String>,
    pub oauth_token_url: String,
    pub oauth_auth_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub credentials_path: Option<PathBuf>,
}

impl Default for EarthEngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://earthengine.googleapis.com".to_string(),
            project: None,
            oauth_token_url: "https://oauth2.googleapis.com/token".to_string(),
            oauth_auth_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            redirect_uri: "https://code.earthengine.google.com/client-auth".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/earthengine".to_string(),
                "https://www.googleapis.com/auth/devstorage.full_control".to_string(),
            ],
            client_id: None,
            client_secret: None,
            credentials_path: None,
        }
    }
}

impl EarthEngineConfig {
    /// Configured credentials file, or the location the platform's own tools use.
    pub fn credentials_path(&self) -> PathBuf {
        match &self.credentials_path {
            Some(path) => path.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("earthengine")
                .join("credentials"),
        }
    }
}
