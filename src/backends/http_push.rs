//! Push-token gateways.

use serde::Deserialize;
use url::Url;

use crate::backends::{BoxFuture, PushGateway};
use crate::error::TokenError;

/// Exchanges a project id for a push-routing token over HTTPS.
///
/// A `501 Not Implemented` from the endpoint means the messaging backend is
/// not provisioned for this build and is classified as the expected
/// [`TokenError::NotConfigured`]; every other failure is transport-level.
pub struct HttpPushGateway {
    client: reqwest::Client,
    endpoint: Url,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl HttpPushGateway {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn from_endpoint(endpoint: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(endpoint)?))
    }
}

impl PushGateway for HttpPushGateway {
    fn issue_token<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, Result<String, TokenError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.endpoint.clone())
                .json(&serde_json::json!({ "projectId": project_id }))
                .send()
                .await
                .map_err(|err| TokenError::Transport(err.to_string()))?;

            if response.status() == reqwest::StatusCode::NOT_IMPLEMENTED {
                return Err(TokenError::NotConfigured);
            }

            let body: TokenResponse = response
                .error_for_status()
                .map_err(|err| TokenError::Transport(err.to_string()))?
                .json()
                .await
                .map_err(|err| TokenError::Transport(err.to_string()))?;

            Ok(body.token)
        })
    }
}

/// Gateway for builds with no push backend at all. Always reports
/// not-configured, which the provisioner degrades to `push_available = false`.
pub struct NullPushGateway;

impl PushGateway for NullPushGateway {
    fn issue_token<'a>(&'a self, _project_id: &'a str) -> BoxFuture<'a, Result<String, TokenError>> {
        Box::pin(async move { Err(TokenError::NotConfigured) })
    }
}
