//! Lambda Invoke API client.
//!
//! # Responsibilities
//! - POST event payloads to `/2015-03-31/functions/{name}/invocations`
//! - Sign requests when credentials are available (environment, then shared profile)
//! - Report `X-Amz-Function-Error` as a function error, not a transport error
//!
//! # Design Decisions
//! - Without credentials requests go out unsigned, which local emulators accept
//! - One deadline covers the whole call, including reading the payload

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use url::Url;

use crate::config::LambdaConfig;
use crate::invoke::profile::SharedProfile;
use crate::invoke::sigv4::{sign_request, uri_encode, Credentials, SigningParams};
use crate::invoke::{Invoke, InvokeError, InvokeOutput, InvokeResult};

const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";
const INVOCATION_TYPE_HEADER: &str = "x-amz-invocation-type";

/// HTTP client for the Lambda Invoke API.
#[derive(Debug, Clone)]
pub struct LambdaClient {
    http: reqwest::Client,
    endpoint: Url,
    region: String,
    credentials: Option<Credentials>,
    timeout_secs: u64,
}

impl LambdaClient {
    /// Build a client from configuration, picking credentials up from the
    /// environment or the shared AWS profile.
    pub fn from_config(config: &LambdaConfig) -> InvokeResult<Self> {
        Self::with_profile(config, SharedProfile::from_env())
    }

    /// Build a client from configuration and an already loaded shared profile.
    ///
    /// Environment credentials take precedence over the profile's.
    pub fn with_profile(config: &LambdaConfig, profile: SharedProfile) -> InvokeResult<Self> {
        let region = config.resolved_region(profile.region.as_deref());
        let endpoint = config.resolved_endpoint(&region);
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| InvokeError::Other(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Self::new(endpoint, region, config.timeout_secs)?;
        Ok(match Credentials::from_env().or(profile.credentials) {
            Some(credentials) => client.with_credentials(credentials),
            None => {
                tracing::warn!("No AWS credentials in environment or shared profile, invoking unsigned");
                client
            }
        })
    }

    pub fn new(endpoint: Url, region: impl Into<String>, timeout_secs: u64) -> InvokeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            region: region.into(),
            credentials: None,
            timeout_secs,
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// URL of the invocation resource for `function_name`.
    pub fn invocation_url(&self, function_name: &str) -> InvokeResult<Url> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let url = format!(
            "{}/2015-03-31/functions/{}/invocations",
            base,
            uri_encode(function_name)
        );
        Url::parse(&url).map_err(|e| InvokeError::Other(format!("invalid invocation URL: {}", e)))
    }
}

#[async_trait]
impl Invoke for LambdaClient {
    async fn invoke(&self, function_name: &str, payload: Bytes) -> InvokeResult<InvokeOutput> {
        let url = self.invocation_url(function_name)?;

        let mut request = self
            .http
            .post(url.clone())
            .header(INVOCATION_TYPE_HEADER, "RequestResponse");

        if let Some(credentials) = &self.credentials {
            let params = SigningParams {
                credentials,
                region: &self.region,
                service: "lambda",
                time: Utc::now(),
            };
            for (name, value) in sign_request(&params, "POST", &url, &payload) {
                request = request.header(name, value);
            }
        }

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(InvokeOutput {
            payload: body,
            function_error,
        })
    }
}

impl LambdaClient {
    fn classify(&self, error: reqwest::Error) -> InvokeError {
        if error.is_timeout() {
            InvokeError::Timeout(self.timeout_secs)
        } else {
            InvokeError::Request(error)
        }
    }
}
