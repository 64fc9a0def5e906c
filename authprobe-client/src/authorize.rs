use authprobe_core::ProbeError;
use url::Url;

/// Parameters for constructing the browser-navigable authorization URL.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    /// Provider public origin, e.g. `http://localhost:4444`.
    pub provider_url: String,
    /// OAuth2 client identifier.
    pub client_id: String,
    /// Callback the provider will redirect to.
    pub redirect_uri: String,
    /// Space-separated scope string.
    pub scope: String,
}

/// Build `{provider}/oauth2/auth?...` for the authorization-code flow.
///
/// Returns the URL together with the freshly generated opaque `state` so the
/// caller can correlate the eventual callback. The URL is meant to be opened
/// in a browser; this function never fetches.
pub fn authorize_url(req: &AuthorizeRequest) -> Result<(Url, String), ProbeError> {
    let state = uuid::Uuid::new_v4().to_string();
    let mut url = Url::parse(&req.provider_url).map_err(|e| ProbeError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ProbeError::Url("provider url cannot be a base".into()))?
        .pop_if_empty()
        .extend(["oauth2", "auth"]);
    url.query_pairs_mut()
        .append_pair("client_id", &req.client_id)
        .append_pair("redirect_uri", &req.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &req.scope)
        .append_pair("state", &state);
    Ok((url, state))
}
