use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("Remote API returned {status}: {message}")]
    RemoteError { status: u16, message: String },
}

impl ExportError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Check network connectivity to the Earth Engine API",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "The remote response was not valid JSON; retry later",
            Self::TomlError(_) => "Fix the syntax of the configuration file",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Review the configuration file and command-line flags"
            }
            Self::AuthError { .. } => {
                "Delete the cached credentials file and run again to re-authenticate"
            }
            Self::RemoteError { status, .. } if *status == 401 || *status == 403 => {
                "Make sure the account is registered for Earth Engine and the project is correct"
            }
            Self::RemoteError { .. } => {
                "Inspect the Tasks tab to see which exports were registered before the failure"
            }
        }
    }

    /// Process exit code used by the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } | Self::TomlError(_) => 2,
            Self::AuthError { .. } => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        let config = ExportError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(config.exit_code(), 2);
        assert_eq!(ExportError::auth("denied").exit_code(), 3);

        let remote = ExportError::RemoteError {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(remote.exit_code(), 1);
    }

    #[test]
    fn test_remote_permission_errors_get_specific_suggestion() {
        let forbidden = ExportError::RemoteError {
            status: 403,
            message: "denied".to_string(),
        };
        assert!(forbidden.recovery_suggestion().contains("project"));
    }
}
