use crate::{RawResponse, RequestSpec, Transport, TransportError};
use async_trait::async_trait;
use authprobe_core::ProbeError;
use serde_json::Value;
use url::Url;

/// Reqwest-backed [`Transport`] against a single base origin.
///
/// An optional bearer token is attached to every request, matching how the
/// console talks to the resource API. Provider-flow probes use a transport
/// without a token.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    bearer: Option<String>,
}

impl HttpTransport {
    /// Create a transport for `base`, e.g. `http://localhost:3000`.
    pub fn new(base: &str) -> Result<Self, ProbeError> {
        let base = Url::parse(base).map_err(|e| ProbeError::Url(e.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            bearer: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Whether a non-empty bearer token is configured.
    pub fn has_bearer(&self) -> bool {
        self.bearer.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Tracker guard for resource-API probes: refuses dispatch when no
    /// bearer token is present, so the call never reaches the network.
    pub fn bearer_guard(&self) -> Result<(), String> {
        if self.has_bearer() {
            Ok(())
        } else {
            Err(ProbeError::MissingToken.to_string())
        }
    }

    fn request_url(&self, spec: &RequestSpec) -> Result<Url, TransportError> {
        let mut url = self
            .base
            .join(spec.path.trim_start_matches('/'))
            .map_err(|e| TransportError::message(e.to_string()))?;
        if !spec.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(spec.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, spec: &RequestSpec) -> Result<RawResponse, TransportError> {
        let url = self.request_url(spec)?;
        log::debug!("{} {}", spec.method, url);

        let mut req = self.client.request(spec.method.clone(), url);
        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &spec.body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::message(e.to_string()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError {
                message: e.to_string(),
                status: Some(status),
                body: None,
            })?;

        // The provider answers JSON everywhere; anything else (proxy error
        // pages and the like) is kept verbatim as a string value.
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_path_and_query_against_base() {
        let t = HttpTransport::new("http://localhost:3000").unwrap();
        let spec = RequestSpec::get("/oauth/consent").with_query("consent_challenge", "abc");
        let url = t.request_url(&spec).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/oauth/consent?consent_challenge=abc"
        );
    }

    #[test]
    fn empty_bearer_counts_as_absent() {
        let t = HttpTransport::new("http://localhost:3000")
            .unwrap()
            .with_bearer("");
        assert!(!t.has_bearer());
        assert!(t.bearer_guard().is_err());
        assert!(t.with_bearer("tok").bearer_guard().is_ok());
    }
}
