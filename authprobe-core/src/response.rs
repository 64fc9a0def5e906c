use serde::{Deserialize, Serialize};

/// The uniform `{success, message, data}` envelope the provider wraps every
/// JSON body in, for both 2xx and error statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the provider considers the operation successful.
    pub success: bool,
    /// Human-readable outcome message, if the provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operation payload; absent on many failure responses.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// The provider message, or `fallback` when none was supplied.
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => fallback,
        }
    }
}

/// Consent-request metadata returned for a `consent_challenge`.
///
/// When the provider has already satisfied consent (a trusted client or a
/// remembered grant) it short-circuits the review by returning `redirect_to`
/// and an empty scope list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentInfo {
    /// Display name of the relying application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Scopes the relying application asked for, in request order.
    #[serde(default)]
    pub requested_scope: Vec<String>,
    /// Present iff the provider decided the review can be skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Payload of a successful consent decision: where to send the browser next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectData {
    /// Provider-issued continuation URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Body for registering a client with the provider's admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRegistration {
    /// OAuth2 client identifier.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Display name shown on the consent screen.
    pub client_name: String,
    /// Grant types the client may use.
    pub grant_types: Vec<String>,
    /// Response types the client may request.
    pub response_types: Vec<String>,
    /// Allowed redirect URIs.
    pub redirect_uris: Vec<String>,
    /// Space-separated scope string the client may request.
    pub scope: String,
    /// How the client authenticates at the token endpoint.
    pub token_endpoint_auth_method: String,
}

impl ClientRegistration {
    /// A registration with the grant/response/auth-method defaults the
    /// console uses for authorization-code clients.
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        let client_id = client_id.into();
        Self {
            client_name: client_id.clone(),
            client_id,
            client_secret: client_secret.into(),
            grant_types: vec!["authorization_code".into(), "refresh_token".into()],
            response_types: vec!["code".into()],
            redirect_uris: vec![redirect_uri.into()],
            scope: scope.into(),
            token_endpoint_auth_method: "client_secret_post".into(),
        }
    }
}

/// Body for creating a resource-API token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCreation {
    /// Token display name.
    pub name: String,
    /// Optional expiry, e.g. `2026-12-31`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_time: Option<String>,
}
