//! Google Cloud credentials for the speech API
//!
//! Credentials come from, in order: inline service-account JSON, base64
//! service-account JSON, or the ambient Application Default Credentials
//! chain. The token provider is built on first use and then shared by every
//! request in the process.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use clipvox_core::TtsSettings;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{Result, VoiceError};

/// OAuth scope for Cloud Text-to-Speech
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Where the service-account identity comes from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Service-account key file contents
    ServiceAccountJson(String),
    /// Application Default Credentials (env file, gcloud, metadata server)
    Ambient,
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceAccountJson(_) => f.write_str("ServiceAccountJson(<redacted>)"),
            Self::Ambient => f.write_str("Ambient"),
        }
    }
}

impl CredentialSource {
    /// Resolve the source from settings; inline JSON wins over base64
    pub fn from_settings(settings: &TtsSettings) -> Result<Self> {
        if let Some(json) = non_blank(settings.credentials_json.as_deref()) {
            return Ok(Self::ServiceAccountJson(json.to_string()));
        }

        if let Some(encoded) = non_blank(settings.credentials_base64.as_deref()) {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| {
                    VoiceError::ConfigError(format!("credentials are not valid base64: {}", e))
                })?;
            let json = String::from_utf8(bytes).map_err(|_| {
                VoiceError::ConfigError("decoded credentials are not UTF-8".to_string())
            })?;
            return Ok(Self::ServiceAccountJson(json));
        }

        Ok(Self::Ambient)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Turns a [`CredentialSource`] into a live token provider
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn build(&self, source: &CredentialSource) -> Result<Arc<dyn TokenProvider>>;
}

/// Builds providers with `gcp_auth`
#[derive(Debug, Default, Clone, Copy)]
pub struct GcpAuthFactory;

#[async_trait]
impl ProviderFactory for GcpAuthFactory {
    async fn build(&self, source: &CredentialSource) -> Result<Arc<dyn TokenProvider>> {
        match source {
            CredentialSource::ServiceAccountJson(json) => {
                info!("Using service-account credentials for speech synthesis");
                let account = CustomServiceAccount::from_json(json)?;
                Ok(Arc::new(account))
            }
            CredentialSource::Ambient => {
                info!("Using application default credentials for speech synthesis");
                Ok(gcp_auth::provider().await?)
            }
        }
    }
}

/// Lazily initialized, process-wide token source
pub struct GoogleCredentials {
    source: CredentialSource,
    factory: Arc<dyn ProviderFactory>,
    provider: OnceCell<Arc<dyn TokenProvider>>,
}

impl GoogleCredentials {
    pub fn new(source: CredentialSource) -> Self {
        Self::with_factory(source, Arc::new(GcpAuthFactory))
    }

    pub fn with_factory(source: CredentialSource, factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            source,
            factory,
            provider: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &TtsSettings) -> Result<Self> {
        Ok(Self::new(CredentialSource::from_settings(settings)?))
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Build the token provider once; concurrent first callers wait on the
    /// same build, and a failed build is retried on the next call
    async fn provider(&self) -> Result<&Arc<dyn TokenProvider>> {
        self.provider
            .get_or_try_init(|| self.factory.build(&self.source))
            .await
    }

    /// A fresh access token for the cloud-platform scope
    pub async fn access_token(&self) -> Result<String> {
        let provider = self.provider().await?;
        let token = provider.token(&[CLOUD_PLATFORM_SCOPE]).await?;
        debug!("Obtained access token");
        Ok(token.as_str().to_string())
    }

    /// `Authorization: Bearer` headers for one synthesis run
    pub async fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.access_token().await?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| VoiceError::Auth(format!("access token is not a valid header: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCredentials")
            .field("source", &self.source)
            .field("initialized", &self.provider.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(json: Option<&str>, b64: Option<&str>) -> TtsSettings {
        TtsSettings {
            credentials_json: json.map(str::to_string),
            credentials_base64: b64.map(str::to_string),
            endpoint: None,
        }
    }

    #[test]
    fn test_inline_json_wins() {
        let source =
            CredentialSource::from_settings(&settings(Some(r#"{"a":1}"#), Some("eyJiIjoyfQ==")))
                .unwrap();
        assert_eq!(source, CredentialSource::ServiceAccountJson(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_base64_is_decoded() {
        let source = CredentialSource::from_settings(&settings(None, Some(" eyJiIjoyfQ== ")))
            .unwrap();
        assert_eq!(source, CredentialSource::ServiceAccountJson(r#"{"b":2}"#.to_string()));
    }

    #[test]
    fn test_blank_values_fall_back_to_ambient() {
        let source = CredentialSource::from_settings(&settings(Some("  "), Some(""))).unwrap();
        assert_eq!(source, CredentialSource::Ambient);
    }

    #[test]
    fn test_invalid_base64_is_config_error() {
        let err = CredentialSource::from_settings(&settings(None, Some("not base64!!")))
            .unwrap_err();
        assert!(matches!(err, VoiceError::ConfigError(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let source = CredentialSource::ServiceAccountJson("private_key".to_string());
        assert!(!format!("{:?}", source).contains("private_key"));
    }

    #[tokio::test]
    async fn test_malformed_service_account_is_auth_error() {
        let credentials =
            GoogleCredentials::new(CredentialSource::ServiceAccountJson("{}".to_string()));
        let err = credentials.auth_headers().await.unwrap_err();
        assert!(err.is_auth_failure());
        assert!(!credentials.provider.initialized());
    }

    struct FixedToken;

    #[async_trait]
    impl TokenProvider for FixedToken {
        async fn token(
            &self,
            _scopes: &[&str],
        ) -> std::result::Result<Arc<gcp_auth::Token>, gcp_auth::Error> {
            let token: gcp_auth::Token =
                serde_json::from_str(r#"{"access_token": "tok-1", "expires_in": 3600}"#).unwrap();
            Ok(Arc::new(token))
        }

        async fn project_id(&self) -> std::result::Result<Arc<str>, gcp_auth::Error> {
            Ok(Arc::from("test-project"))
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        builds: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ProviderFactory for CountingFactory {
        async fn build(&self, _source: &CredentialSource) -> Result<Arc<dyn TokenProvider>> {
            self.builds.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(Arc::new(FixedToken))
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_use_builds_once() {
        let factory = Arc::new(CountingFactory::default());
        let credentials = Arc::new(GoogleCredentials::with_factory(
            CredentialSource::Ambient,
            factory.clone(),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let credentials = credentials.clone();
                tokio::spawn(async move { credentials.auth_headers().await })
            })
            .collect();
        for task in tasks {
            let headers = task.await.unwrap().unwrap();
            assert_eq!(headers[AUTHORIZATION], "Bearer tok-1");
        }

        assert_eq!(factory.builds.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(credentials.provider.initialized());
    }
}
