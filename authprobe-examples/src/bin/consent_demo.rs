use authprobe_client::HttpTransport;
use authprobe_core::Locale;
use authprobe_flow::{ConsentController, ConsentState, ProviderConsent};

/// Walks the consent handshake for a live challenge: resolves it, prints the
/// scope review, then approves or rejects based on AUTHPROBE_CONSENT_ACTION.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("AUTHPROBE_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let challenge = std::env::var("AUTHPROBE_CONSENT_CHALLENGE").ok();
    let action =
        std::env::var("AUTHPROBE_CONSENT_ACTION").unwrap_or_else(|_| "approve".to_string());

    let transport = HttpTransport::new(&base_url)?;
    let mut controller = ConsentController::new(ProviderConsent::new(transport));
    controller.resolve(challenge.as_deref()).await?;

    match controller.state() {
        ConsentState::Failed { message } => {
            println!("Challenge could not be resolved: {message}");
            return Ok(());
        }
        ConsentState::Redirecting { target } => {
            println!("Consent already satisfied, provider redirects to: {target}");
            return Ok(());
        }
        ConsentState::Ready(_) => {
            println!(
                "{} requests the following permissions:",
                controller.client_name().unwrap_or("A third-party application")
            );
            for row in controller.scope_rows(Locale::En) {
                println!("  - {} ({}): {}", row.name, row.id, row.description);
            }
        }
        state => println!("Unexpected state after resolve: {state:?}"),
    }

    match action.as_str() {
        "reject" => {
            let reason = std::env::var("AUTHPROBE_REJECT_REASON").ok();
            controller.reject(reason.as_deref()).await?;
        }
        _ => controller.approve(true).await?,
    }

    match controller.state() {
        ConsentState::Redirecting { target } => {
            println!("Decision accepted, navigate to: {target}");
        }
        ConsentState::Ready(_) => {
            println!(
                "Decision not accepted: {}",
                controller.last_error().unwrap_or("no error recorded")
            );
        }
        state => println!("Unexpected state after decision: {state:?}"),
    }

    Ok(())
}
