//! Bearer tokens for the Monitoring API.

use std::fmt;
use std::sync::Arc;

use gcp_auth::TokenProvider;

use crate::core::{AuthConfig, DumpError, Result};

/// Where request tokens come from.
#[derive(Clone)]
pub enum Credentials {
    /// A token obtained out of band, e.g. `gcloud auth print-access-token`.
    Static(String),
    /// Application Default Credentials, refreshed by `gcp_auth` as needed.
    ApplicationDefault {
        provider: Arc<dyn TokenProvider>,
        scopes: Vec<String>,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Static(_) => f.write_str("Credentials::Static(..)"),
            Credentials::ApplicationDefault { scopes, .. } => f
                .debug_struct("Credentials::ApplicationDefault")
                .field("scopes", scopes)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Wrap a static token.
    pub fn from_token<S: Into<String>>(token: S) -> Self {
        Credentials::Static(token.into())
    }

    /// Discover Application Default Credentials.
    pub async fn application_default(scopes: Vec<String>) -> Result<Self> {
        let provider = gcp_auth::provider().await.map_err(|e| {
            DumpError::connection(format!("no Application Default Credentials found: {e}"))
        })?;
        Ok(Credentials::ApplicationDefault { provider, scopes })
    }

    /// Static token when configured, Application Default Credentials otherwise.
    pub async fn from_config(auth: &AuthConfig) -> Result<Self> {
        match &auth.access_token {
            Some(token) => {
                tracing::debug!("Using static access token");
                Ok(Self::from_token(token.clone()))
            },
            None => {
                tracing::debug!(scopes = ?auth.scopes, "Using Application Default Credentials");
                Self::application_default(auth.scopes.clone()).await
            },
        }
    }

    /// Token for the next request.
    pub async fn bearer_token(&self) -> Result<String> {
        match self {
            Credentials::Static(token) => Ok(token.clone()),
            Credentials::ApplicationDefault { provider, scopes } => {
                let scopes: Vec<&str> = scopes.iter().map(String::as_str).collect();
                let token = provider
                    .token(&scopes)
                    .await
                    .map_err(|e| DumpError::auth(format!("failed to obtain access token: {e}")))?;
                Ok(token.as_str().to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let credentials = Credentials::from_token("ya29.test");
        assert_eq!(credentials.bearer_token().await.unwrap(), "ya29.test");
    }

    #[tokio::test]
    async fn test_config_token_takes_precedence() {
        let auth = AuthConfig {
            access_token: Some("configured".to_string()),
            ..AuthConfig::default()
        };
        let credentials = Credentials::from_config(&auth).await.unwrap();
        assert_eq!(credentials.bearer_token().await.unwrap(), "configured");
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", Credentials::from_token("secret-value"));
        assert!(!rendered.contains("secret-value"));
    }
}
