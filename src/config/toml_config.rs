use crate::config::{AppConfig, Boundary};
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_finite, validate_range, validate_url,
    validate_year_range, Validate,
};
use regex::Regex;
use std::path::Path;

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置（缺少的區段使用預設值）
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${EE_PROJECT})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExportError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let export = &self.export;
        validate_year_range(export.start_year, export.end_year)?;
        validate_non_empty_string("export.collection_id", &export.collection_id)?;
        validate_non_empty_string("export.aod_band", &export.aod_band)?;
        validate_non_empty_string("export.qa_band", &export.qa_band)?;
        validate_positive_finite("export.scale_factor", export.scale_factor)?;
        validate_positive_finite("export.export_scale", export.export_scale)?;
        validate_non_empty_string("export.crs", &export.crs)?;
        validate_range("export.max_pixels", export.max_pixels, 1, u64::MAX)?;
        validate_non_empty_string("export.region_tag", &export.region_tag)?;
        validate_non_empty_string("export.drive_folder", &export.drive_folder)?;
        validate_non_empty_string("export.file_prefix", &export.file_prefix)?;
        validate_non_empty_string("export.description_prefix", &export.description_prefix)?;

        match &export.boundary {
            Boundary::Table {
                table_id,
                property,
                value,
            } => {
                validate_non_empty_string("export.boundary.table_id", table_id)?;
                validate_non_empty_string("export.boundary.property", property)?;
                validate_non_empty_string("export.boundary.value", value)?;
            }
            Boundary::Polygon { coordinates } => {
                // Closed rings repeat the first position last, so a triangle has four.
                let is_closed_ring =
                    |ring: &Vec<[f64; 2]>| ring.len() >= 4 && ring.first() == ring.last();
                if coordinates.is_empty() || !coordinates.iter().all(is_closed_ring) {
                    return Err(ExportError::InvalidConfigValueError {
                        field: "export.boundary.coordinates".to_string(),
                        value: format!("{:?}", coordinates),
                        reason: "every ring must be closed and have at least four positions"
                            .to_string(),
                    });
                }
            }
        }

        let ee = &self.earth_engine;
        validate_url("earth_engine.api_base_url", &ee.api_base_url)?;
        validate_url("earth_engine.oauth_token_url", &ee.oauth_token_url)?;
        validate_url("earth_engine.oauth_auth_url", &ee.oauth_auth_url)?;
        if let Some(project) = &ee.project {
            validate_non_empty_string("earth_engine.project", project)?;
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
