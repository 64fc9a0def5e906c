use crate::RequestSpec;
use authprobe_core::{ClientRegistration, TokenCreation};
use http::Method;
use serde_json::json;

/// One row of the probe catalog: enough metadata to render a test panel and
/// decide whether the bearer guard applies, without per-endpoint wiring.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    /// Tracker key for this probe.
    pub key: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Path template as shown to the operator.
    pub path: &'static str,
    /// What the probe exercises.
    pub description: &'static str,
    /// Scope the resource endpoint is guarded by, if any.
    pub scope: Option<&'static str>,
    /// Whether the call requires an operator-supplied bearer token.
    pub requires_bearer: bool,
}

/// The full probe catalog, provider flow first, then the resource API.
pub static ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor {
        key: "get_login",
        method: Method::GET,
        path: "/oauth/login",
        description: "Get login request information from the provider",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "post_login",
        method: Method::POST,
        path: "/oauth/login",
        description: "Submit username and password for OAuth login",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "post_login_2fa",
        method: Method::POST,
        path: "/oauth/login/2fa",
        description: "Submit 2FA code to complete login",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "get_consent",
        method: Method::GET,
        path: "/oauth/consent",
        description: "Get consent request information from the provider",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "post_consent",
        method: Method::POST,
        path: "/oauth/consent",
        description: "Grant consent for the requested scopes",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "post_consent_reject",
        method: Method::POST,
        path: "/oauth/consent/reject",
        description: "Reject the consent request",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "get_logout",
        method: Method::GET,
        path: "/oauth/logout",
        description: "Handle OAuth logout request",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "register_client",
        method: Method::POST,
        path: "/oauth/admin/clients",
        description: "Register an OAuth client with the admin API",
        scope: None,
        requires_bearer: false,
    },
    EndpointDescriptor {
        key: "get_userinfo",
        method: Method::GET,
        path: "/api/v1/oauth/userinfo",
        description: "Get user information based on requested OpenID scopes",
        scope: Some("openid / profile"),
        requires_bearer: true,
    },
    EndpointDescriptor {
        key: "get_balance",
        method: Method::GET,
        path: "/api/v1/oauth/balance",
        description: "Get user balance information",
        scope: Some("balance:read"),
        requires_bearer: true,
    },
    EndpointDescriptor {
        key: "get_usage",
        method: Method::GET,
        path: "/api/v1/oauth/usage",
        description: "Get usage statistics for the current period",
        scope: Some("usage:read"),
        requires_bearer: true,
    },
    EndpointDescriptor {
        key: "get_tokens",
        method: Method::GET,
        path: "/api/v1/oauth/tokens",
        description: "List all API tokens for the user",
        scope: Some("tokens:read"),
        requires_bearer: true,
    },
    EndpointDescriptor {
        key: "create_token",
        method: Method::POST,
        path: "/api/v1/oauth/tokens",
        description: "Create a new API token",
        scope: Some("tokens:write"),
        requires_bearer: true,
    },
    EndpointDescriptor {
        key: "delete_token",
        method: Method::DELETE,
        path: "/api/v1/oauth/tokens/:id",
        description: "Delete an API token by ID",
        scope: Some("tokens:write"),
        requires_bearer: true,
    },
];

/// Find a catalog entry by tracker key.
pub fn descriptor(key: &str) -> Option<&'static EndpointDescriptor> {
    ENDPOINTS.iter().find(|d| d.key == key)
}

/// `GET /oauth/login?login_challenge=…`
pub fn get_login(login_challenge: &str) -> RequestSpec {
    RequestSpec::get("/oauth/login").with_query("login_challenge", login_challenge)
}

/// `POST /oauth/login?login_challenge=…` with credentials.
pub fn post_login(login_challenge: &str, username: &str, password: &str) -> RequestSpec {
    RequestSpec::post(
        "/oauth/login",
        json!({ "username": username, "password": password }),
    )
    .with_query("login_challenge", login_challenge)
}

/// `POST /oauth/login/2fa?login_challenge=…` with the second factor.
pub fn post_login_2fa(login_challenge: &str, code: &str) -> RequestSpec {
    RequestSpec::post("/oauth/login/2fa", json!({ "code": code }))
        .with_query("login_challenge", login_challenge)
}

/// `GET /oauth/consent?consent_challenge=…`
pub fn get_consent(consent_challenge: &str) -> RequestSpec {
    RequestSpec::get("/oauth/consent").with_query("consent_challenge", consent_challenge)
}

/// `POST /oauth/consent` granting `grant_scope` with a persistence flag.
pub fn post_consent(consent_challenge: &str, grant_scope: &[String], remember: bool) -> RequestSpec {
    RequestSpec::post(
        "/oauth/consent",
        json!({
            "consent_challenge": consent_challenge,
            "grant_scope": grant_scope,
            "remember": remember,
        }),
    )
}

/// `POST /oauth/consent/reject` with an optional reason.
pub fn reject_consent(consent_challenge: &str, reason: Option<&str>) -> RequestSpec {
    let mut body = json!({ "consent_challenge": consent_challenge });
    if let Some(reason) = reason {
        body["reason"] = json!(reason);
    }
    RequestSpec::post("/oauth/consent/reject", body)
}

/// `GET /oauth/logout?logout_challenge=…`
pub fn get_logout(logout_challenge: &str) -> RequestSpec {
    RequestSpec::get("/oauth/logout").with_query("logout_challenge", logout_challenge)
}

/// `GET /api/v1/oauth/userinfo`
pub fn userinfo() -> RequestSpec {
    RequestSpec::get("/api/v1/oauth/userinfo")
}

/// `GET /api/v1/oauth/balance`
pub fn balance() -> RequestSpec {
    RequestSpec::get("/api/v1/oauth/balance")
}

/// `GET /api/v1/oauth/usage`
pub fn usage() -> RequestSpec {
    RequestSpec::get("/api/v1/oauth/usage")
}

/// `GET /api/v1/oauth/tokens`
pub fn list_tokens() -> RequestSpec {
    RequestSpec::get("/api/v1/oauth/tokens")
}

/// `POST /api/v1/oauth/tokens`
pub fn create_token(token: &TokenCreation) -> RequestSpec {
    RequestSpec::post(
        "/api/v1/oauth/tokens",
        serde_json::to_value(token).unwrap_or_default(),
    )
}

/// `DELETE /api/v1/oauth/tokens/:id`
pub fn delete_token(id: &str) -> RequestSpec {
    RequestSpec::delete(format!("/api/v1/oauth/tokens/{id}"))
}

/// `POST /oauth/admin/clients`
pub fn register_client(registration: &ClientRegistration) -> RequestSpec {
    RequestSpec::post(
        "/oauth/admin/clients",
        serde_json::to_value(registration).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let mut keys: Vec<_> = ENDPOINTS.iter().map(|d| d.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ENDPOINTS.len());
    }

    #[test]
    fn resource_endpoints_all_carry_the_bearer_guard() {
        for d in ENDPOINTS {
            assert_eq!(d.requires_bearer, d.path.starts_with("/api/"), "{}", d.key);
        }
    }

    #[test]
    fn reject_reason_is_omitted_when_absent() {
        let spec = reject_consent("abc", None);
        let body = spec.body.unwrap();
        assert!(body.get("reason").is_none());
        assert_eq!(body["consent_challenge"], "abc");
    }

    #[test]
    fn consent_grant_carries_full_scope_list() {
        let scopes = vec!["openid".to_string(), "balance:read".to_string()];
        let spec = post_consent("abc", &scopes, true);
        let body = spec.body.unwrap();
        assert_eq!(body["grant_scope"], serde_json::json!(["openid", "balance:read"]));
        assert_eq!(body["remember"], true);
    }

    #[test]
    fn descriptor_lookup_by_key() {
        let d = descriptor("get_userinfo").unwrap();
        assert_eq!(d.path, "/api/v1/oauth/userinfo");
        assert!(d.requires_bearer);
    }
}
