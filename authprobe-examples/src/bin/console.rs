use authprobe_client::{authorize_url, endpoints, AuthorizeRequest, HttpTransport};
use authprobe_core::{ClientRegistration, TokenCreation};
use authprobe_flow::Tracker;
use std::sync::Arc;

/// Drives the probe catalog against a live deployment: registers a client,
/// prints the browser-navigable authorization URL, then exercises the
/// bearer-guarded resource API.

struct Config {
    base_url: String,
    provider_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    bearer_token: Option<String>,
}

impl Config {
    fn from_env() -> Self {
        Self {
            base_url: std::env::var("AUTHPROBE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            provider_url: std::env::var("AUTHPROBE_PROVIDER_URL")
                .unwrap_or_else(|_| "http://localhost:4444".to_string()),
            client_id: std::env::var("AUTHPROBE_CLIENT_ID")
                .unwrap_or_else(|_| "test-client".to_string()),
            client_secret: std::env::var("AUTHPROBE_CLIENT_SECRET")
                .unwrap_or_else(|_| "test-secret".to_string()),
            redirect_uri: std::env::var("AUTHPROBE_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:3000/oauth/callback".to_string()),
            scope: std::env::var("AUTHPROBE_SCOPE").unwrap_or_else(|_| {
                "openid profile balance:read usage:read tokens:read tokens:write".to_string()
            }),
            bearer_token: std::env::var("AUTHPROBE_BEARER_TOKEN").ok(),
        }
    }
}

fn report(tracker: &Tracker, key: &str) {
    match tracker.result_of(key) {
        Some(result) => println!(
            "{key}: status {} in {}ms\n{}",
            result.status,
            result.latency_ms,
            serde_json::to_string_pretty(&result.body).unwrap_or_default()
        ),
        None => println!("{key}: no result"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    println!("Console base: {}", config.base_url);

    let registration = ClientRegistration::authorization_code(
        &config.client_id,
        &config.client_secret,
        &config.redirect_uri,
        &config.scope,
    );

    let plain = Arc::new(HttpTransport::new(&config.base_url)?);
    let tracker = Tracker::new(plain);
    tracker
        .invoke("register_client", endpoints::register_client(&registration))
        .await?;
    report(&tracker, "register_client");

    let (url, state) = authorize_url(&AuthorizeRequest {
        provider_url: config.provider_url.clone(),
        client_id: config.client_id.clone(),
        redirect_uri: config.redirect_uri.clone(),
        scope: config.scope.clone(),
    })?;
    println!("\nOpen in a browser to start the flow (state {state}):\n{url}\n");

    // Resource API probes share one tracker; the bearer guard short-circuits
    // every one of them when no token was supplied.
    let mut api = HttpTransport::new(&config.base_url)?;
    if let Some(token) = &config.bearer_token {
        api = api.with_bearer(token);
    }
    let api = Arc::new(api);
    let api_tracker = Tracker::new(api.clone());

    let probes = [
        ("get_userinfo", endpoints::userinfo()),
        ("get_balance", endpoints::balance()),
        ("get_usage", endpoints::usage()),
        ("get_tokens", endpoints::list_tokens()),
        (
            "create_token",
            endpoints::create_token(&TokenCreation {
                name: "authprobe-demo".to_string(),
                expired_time: None,
            }),
        ),
    ];

    let handles: Vec<_> = probes
        .into_iter()
        .map(|(key, spec)| (key, api_tracker.invoke_guarded(key, spec, || api.bearer_guard())))
        .collect();
    for (key, handle) in handles {
        handle.await?;
        report(&api_tracker, key);
    }

    Ok(())
}
