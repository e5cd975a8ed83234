use crate::config::EarthEngineConfig;
use crate::core::Authenticator;
use crate::utils::error::{ExportError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Cached OAuth credentials, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl StoredCredentials {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the file readable by the owner only; it holds a refresh token.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        // mode() only applies on creation; tighten files left by older runs.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(())
    }
}

/// An authenticated session with the platform.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    /// Project saved alongside the cached credentials, if any.
    pub project: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    config: EarthEngineConfig,
}

impl OAuthClient {
    pub fn new(config: EarthEngineConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn authorization_url(&self) -> Result<String> {
        let (client_id, _) = self.client_credentials(None)?;
        let url = Url::parse_with_params(
            &self.config.oauth_auth_url,
            &[
                ("client_id", client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("scope", self.config.scopes.join(" ").as_str()),
            ],
        )
        .map_err(|e| ExportError::ConfigError {
            message: format!("invalid oauth_auth_url: {}", e),
        })?;
        Ok(url.to_string())
    }

    /// Exchanges a refresh token for a short-lived access token.
    pub async fn refresh(&self, credentials: &StoredCredentials) -> Result<Session> {
        let (client_id, client_secret) = self.client_credentials(Some(credentials))?;
        let token = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .await?;

        Ok(Session {
            access_token: token.access_token,
            project: credentials.project.clone(),
        })
    }

    /// Exchanges an authorization code from the consent page for long-lived credentials.
    pub async fn exchange_code(&self, code: &str) -> Result<StoredCredentials> {
        let (client_id, client_secret) = self.client_credentials(None)?;
        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .await?;

        let refresh_token = token
            .refresh_token
            .ok_or_else(|| ExportError::auth("token endpoint did not return a refresh token"))?;

        Ok(StoredCredentials {
            refresh_token,
            client_id: Some(client_id),
            client_secret: Some(client_secret),
            project: self.config.project.clone(),
        })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        tracing::debug!("Requesting token from {}", self.config.oauth_token_url);
        let response = self
            .http
            .post(&self.config.oauth_token_url)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Client id/secret from the credentials file, falling back to configuration.
    fn client_credentials(&self, stored: Option<&StoredCredentials>) -> Result<(String, String)> {
        let client_id = stored
            .and_then(|c| c.client_id.clone())
            .or_else(|| self.config.client_id.clone())
            .ok_or_else(|| ExportError::auth("no OAuth client_id configured"))?;
        let client_secret = stored
            .and_then(|c| c.client_secret.clone())
            .or_else(|| self.config.client_secret.clone())
            .ok_or_else(|| ExportError::auth("no OAuth client_secret configured"))?;
        Ok((client_id, client_secret))
    }
}

/// Opens a session from cached credentials without user interaction.
pub async fn initialize_session(oauth: &OAuthClient, credentials_path: &Path) -> Result<Session> {
    if !credentials_path.exists() {
        return Err(ExportError::auth(format!(
            "no cached credentials at {}",
            credentials_path.display()
        )));
    }
    let credentials = StoredCredentials::load(credentials_path)?;
    oauth.refresh(&credentials).await
}

/// Initializes a session, falling back to one interactive authentication and
/// one retry. A second failure is returned to the caller.
pub async fn connect<A: Authenticator + ?Sized>(
    oauth: &OAuthClient,
    credentials_path: &Path,
    authenticator: &A,
) -> Result<Session> {
    match initialize_session(oauth, credentials_path).await {
        Ok(session) => {
            tracing::info!("🔐 Initialized session from cached credentials");
            Ok(session)
        }
        Err(e) => {
            tracing::warn!("Initialization failed ({}), re-authenticating", e);
            authenticator.authenticate().await?;
            initialize_session(oauth, credentials_path).await
        }
    }
}

/// Consent flow on the terminal: print the URL, read the code from stdin.
pub struct InteractiveAuthenticator {
    oauth: OAuthClient,
    credentials_path: PathBuf,
}

impl InteractiveAuthenticator {
    pub fn new(oauth: OAuthClient, credentials_path: PathBuf) -> Self {
        Self {
            oauth,
            credentials_path,
        }
    }
}

#[async_trait::async_trait]
impl Authenticator for InteractiveAuthenticator {
    async fn authenticate(&self) -> Result<()> {
        let url = self.oauth.authorization_url()?;
        println!("To authorize access, open the following URL in a browser:\n");
        println!("    {}\n", url);

        let code = tokio::task::spawn_blocking(|| -> std::io::Result<String> {
            print!("Enter verification code: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            Ok(line.trim().to_string())
        })
        .await
        .map_err(|e| ExportError::auth(format!("prompt was interrupted: {}", e)))??;

        if code.is_empty() {
            return Err(ExportError::auth("no verification code entered"));
        }

        let credentials = self.oauth.exchange_code(&code).await?;
        credentials.save(&self.credentials_path)?;
        tracing::info!(
            "Credentials saved to {}",
            self.credentials_path.display()
        );
        Ok(())
    }
}
