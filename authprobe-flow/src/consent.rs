use async_trait::async_trait;
use authprobe_client::{endpoints, Transport, TransportError};
use authprobe_core::{
    describe_scope, ApiResponse, ConsentInfo, Locale, ProbeError, RedirectData, ScopeDescriptor,
};

const FETCH_FALLBACK: &str = "Failed to fetch consent information";
const APPROVE_FALLBACK: &str = "Authorization failed";
const REJECT_FALLBACK: &str = "Operation failed";
const NO_REDIRECT: &str = "provider returned no redirect target";

/// Where the consent handshake currently stands.
///
/// `Redirecting` and `Failed` are terminal: the browser leaves the page, or
/// the challenge is unusable and a fresh one is needed. Soft submission
/// errors return to `Ready` instead and are exposed via
/// [`ConsentController::last_error`].
#[derive(Debug, Clone)]
pub enum ConsentState {
    /// Consent info has not been fetched yet.
    Loading,
    /// Consent info is available and awaiting the user's decision.
    Ready(ConsentInfo),
    /// A decision has been submitted and the provider has not answered yet.
    Submitting,
    /// The provider issued a continuation URL; full navigation follows.
    Redirecting {
        /// Where the browser is being sent.
        target: String,
    },
    /// The challenge could not be resolved; no retry is possible.
    Failed {
        /// What went wrong.
        message: String,
    },
}

impl ConsentState {
    /// Short tag for logging.
    fn tag(&self) -> &'static str {
        match self {
            ConsentState::Loading => "loading",
            ConsentState::Ready(_) => "ready",
            ConsentState::Submitting => "submitting",
            ConsentState::Redirecting { .. } => "redirecting",
            ConsentState::Failed { .. } => "failed",
        }
    }
}

/// The provider operations the consent handshake needs.
#[async_trait]
pub trait ConsentService: Send + Sync {
    /// Fetch consent-request metadata for a challenge.
    async fn fetch(&self, challenge: &str) -> Result<ApiResponse<ConsentInfo>, TransportError>;

    /// Approve the request, granting `grant_scope`.
    async fn approve(
        &self,
        challenge: &str,
        grant_scope: &[String],
        remember: bool,
    ) -> Result<ApiResponse<RedirectData>, TransportError>;

    /// Reject the request with an optional reason.
    async fn reject(
        &self,
        challenge: &str,
        reason: Option<&str>,
    ) -> Result<ApiResponse<RedirectData>, TransportError>;
}

/// [`ConsentService`] over any [`Transport`].
pub struct ProviderConsent<T: Transport> {
    transport: T,
}

impl<T: Transport> ProviderConsent<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    async fn envelope<D>(
        &self,
        spec: authprobe_client::RequestSpec,
    ) -> Result<ApiResponse<D>, TransportError>
    where
        D: serde::de::DeserializeOwned,
    {
        let resp = self.transport.execute(&spec).await?;
        // Non-2xx responses still carry the envelope; a body that is not an
        // envelope at all (proxy error page) becomes a failure envelope.
        Ok(serde_json::from_value(resp.body).unwrap_or_else(|_| ApiResponse {
            success: false,
            message: Some(format!("unexpected response (status {})", resp.status)),
            data: None,
        }))
    }
}

#[async_trait]
impl<T: Transport> ConsentService for ProviderConsent<T> {
    async fn fetch(&self, challenge: &str) -> Result<ApiResponse<ConsentInfo>, TransportError> {
        self.envelope(endpoints::get_consent(challenge)).await
    }

    async fn approve(
        &self,
        challenge: &str,
        grant_scope: &[String],
        remember: bool,
    ) -> Result<ApiResponse<RedirectData>, TransportError> {
        self.envelope(endpoints::post_consent(challenge, grant_scope, remember))
            .await
    }

    async fn reject(
        &self,
        challenge: &str,
        reason: Option<&str>,
    ) -> Result<ApiResponse<RedirectData>, TransportError> {
        self.envelope(endpoints::reject_consent(challenge, reason))
            .await
    }
}

/// Drives one consent handshake to a terminal outcome.
///
/// One controller instance serves one page load: `Failed` is final here, and
/// navigating away mid-flight is a valid abandonment.
pub struct ConsentController<S> {
    service: S,
    challenge: Option<String>,
    state: ConsentState,
    last_error: Option<String>,
}

impl<S: ConsentService> ConsentController<S> {
    /// Create a controller in `Loading`.
    pub fn new(service: S) -> Self {
        Self {
            service,
            challenge: None,
            state: ConsentState::Loading,
            last_error: None,
        }
    }

    /// Resolve the challenge extracted from the environment.
    ///
    /// A missing challenge fails immediately with no network call. A payload
    /// carrying `redirect_to` goes straight to `Redirecting` without ever
    /// reaching `Ready`.
    pub async fn resolve(&mut self, challenge: Option<&str>) -> Result<(), ProbeError> {
        if !matches!(self.state, ConsentState::Loading) {
            return Err(ProbeError::InvalidState("resolve requires Loading"));
        }

        let challenge = match challenge {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                self.transition(ConsentState::Failed {
                    message: "missing consent_challenge parameter".into(),
                });
                return Ok(());
            }
        };

        let outcome = self.service.fetch(&challenge).await;
        self.challenge = Some(challenge);

        let next = match outcome {
            Err(err) => {
                log::warn!("consent fetch failed: {err}");
                ConsentState::Failed {
                    message: FETCH_FALLBACK.into(),
                }
            }
            Ok(resp) if !resp.success => ConsentState::Failed {
                message: resp.message_or(FETCH_FALLBACK).to_string(),
            },
            Ok(resp) => {
                let info = resp.data.unwrap_or(ConsentInfo {
                    client_name: None,
                    requested_scope: Vec::new(),
                    redirect_to: None,
                });
                match info.redirect_to {
                    // Already trusted client or remembered grant: the
                    // provider skips the review entirely.
                    Some(target) => ConsentState::Redirecting { target },
                    None => ConsentState::Ready(info),
                }
            }
        };
        self.transition(next);
        Ok(())
    }

    /// Approve, granting the complete requested scope list.
    ///
    /// The grant is all-or-nothing: the submitted list is exactly what the
    /// provider reported, never a client-side subset.
    pub async fn approve(&mut self, remember: bool) -> Result<(), ProbeError> {
        let (info, challenge) = self.take_ready("approve requires Ready")?;
        let outcome = self
            .service
            .approve(&challenge, &info.requested_scope, remember)
            .await;
        self.settle(outcome, APPROVE_FALLBACK, info);
        Ok(())
    }

    /// Reject with an optional free-text reason.
    pub async fn reject(&mut self, reason: Option<&str>) -> Result<(), ProbeError> {
        let (info, challenge) = self.take_ready("reject requires Ready")?;
        let outcome = self.service.reject(&challenge, reason).await;
        self.settle(outcome, REJECT_FALLBACK, info);
        Ok(())
    }

    fn take_ready(&mut self, requirement: &'static str) -> Result<(ConsentInfo, String), ProbeError> {
        let ConsentState::Ready(info) = &self.state else {
            return Err(ProbeError::InvalidState(requirement));
        };
        let info = info.clone();
        let challenge = self
            .challenge
            .clone()
            .ok_or(ProbeError::MissingChallenge("consent_challenge"))?;
        self.last_error = None;
        self.transition(ConsentState::Submitting);
        Ok((info, challenge))
    }

    /// Apply a submission outcome: redirect on success, otherwise record a
    /// soft error and hand the decision back to the user.
    fn settle(
        &mut self,
        outcome: Result<ApiResponse<RedirectData>, TransportError>,
        fallback: &str,
        info: ConsentInfo,
    ) {
        let next = match outcome {
            Ok(resp) if resp.success => {
                match resp.data.and_then(|d| d.redirect_to) {
                    Some(target) => ConsentState::Redirecting { target },
                    None => {
                        // Logically accepted but nowhere to go; let the user
                        // retry rather than dead-ending the page.
                        self.last_error = Some(NO_REDIRECT.to_string());
                        ConsentState::Ready(info)
                    }
                }
            }
            Ok(resp) => {
                self.last_error = Some(resp.message_or(fallback).to_string());
                ConsentState::Ready(info)
            }
            Err(err) => {
                log::warn!("consent submission failed: {err}");
                self.last_error = Some(fallback.to_string());
                ConsentState::Ready(info)
            }
        };
        self.transition(next);
    }

    fn transition(&mut self, next: ConsentState) {
        log::debug!("consent: {} -> {}", self.state.tag(), next.tag());
        self.state = next;
    }

    /// Current state.
    pub fn state(&self) -> &ConsentState {
        &self.state
    }

    /// The most recent soft submission error, if the user has not retried.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Navigation target once `Redirecting` is reached.
    pub fn redirect_target(&self) -> Option<&str> {
        match &self.state {
            ConsentState::Redirecting { target } => Some(target),
            _ => None,
        }
    }

    /// Display name of the relying application, once known.
    pub fn client_name(&self) -> Option<&str> {
        match &self.state {
            ConsentState::Ready(info) => info.client_name.as_deref(),
            _ => None,
        }
    }

    /// Rows for the scope review list.
    ///
    /// Unknown identifiers are listed with the raw identifier as both name
    /// and description; no requested permission is ever hidden. Empty unless
    /// the controller is `Ready`.
    pub fn scope_rows(&self, locale: Locale) -> Vec<ScopeDescriptor> {
        match &self.state {
            ConsentState::Ready(info) => info
                .requested_scope
                .iter()
                .map(|s| describe_scope(s, locale))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubService {
        fetch_calls: AtomicUsize,
        fetch_response: Mutex<Option<Result<ApiResponse<ConsentInfo>, TransportError>>>,
        submit_response: Mutex<Option<Result<ApiResponse<RedirectData>, TransportError>>>,
        rejected_with: Mutex<Option<Option<String>>>,
        approved_with: Mutex<Option<(Vec<String>, bool)>>,
    }

    impl StubService {
        fn on_fetch(self, resp: Result<ApiResponse<ConsentInfo>, TransportError>) -> Self {
            *self.fetch_response.lock().unwrap() = Some(resp);
            self
        }

        fn on_submit(self, resp: Result<ApiResponse<RedirectData>, TransportError>) -> Self {
            *self.submit_response.lock().unwrap() = Some(resp);
            self
        }
    }

    #[async_trait]
    impl ConsentService for StubService {
        async fn fetch(
            &self,
            _challenge: &str,
        ) -> Result<ApiResponse<ConsentInfo>, TransportError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.fetch_response
                .lock()
                .unwrap()
                .take()
                .expect("unexpected fetch")
        }

        async fn approve(
            &self,
            _challenge: &str,
            grant_scope: &[String],
            remember: bool,
        ) -> Result<ApiResponse<RedirectData>, TransportError> {
            *self.approved_with.lock().unwrap() = Some((grant_scope.to_vec(), remember));
            self.submit_response
                .lock()
                .unwrap()
                .take()
                .expect("unexpected approve")
        }

        async fn reject(
            &self,
            _challenge: &str,
            reason: Option<&str>,
        ) -> Result<ApiResponse<RedirectData>, TransportError> {
            *self.rejected_with.lock().unwrap() = Some(reason.map(str::to_string));
            self.submit_response
                .lock()
                .unwrap()
                .take()
                .expect("unexpected reject")
        }
    }

    fn ok_info(info: ConsentInfo) -> Result<ApiResponse<ConsentInfo>, TransportError> {
        Ok(ApiResponse {
            success: true,
            message: None,
            data: Some(info),
        })
    }

    fn review_info() -> ConsentInfo {
        ConsentInfo {
            client_name: Some("demo-app".into()),
            requested_scope: vec!["openid".into(), "unknown:scope".into()],
            redirect_to: None,
        }
    }

    async fn ready_controller(
        submit: Result<ApiResponse<RedirectData>, TransportError>,
    ) -> ConsentController<StubService> {
        let service = StubService::default()
            .on_fetch(ok_info(review_info()))
            .on_submit(submit);
        let mut controller = ConsentController::new(service);
        controller.resolve(Some("challenge-1")).await.unwrap();
        assert!(matches!(controller.state(), ConsentState::Ready(_)));
        controller
    }

    #[tokio::test]
    async fn missing_challenge_fails_without_network() {
        let service = StubService::default();
        let mut controller = ConsentController::new(service);
        controller.resolve(None).await.unwrap();

        let ConsentState::Failed { message } = controller.state() else {
            panic!("expected Failed, got {:?}", controller.state());
        };
        assert!(message.contains("consent_challenge"));
        assert_eq!(controller.service.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn redirect_escape_hatch_skips_ready() {
        let service = StubService::default().on_fetch(ok_info(ConsentInfo {
            client_name: None,
            requested_scope: Vec::new(),
            redirect_to: Some("https://x".into()),
        }));
        let mut controller = ConsentController::new(service);
        controller.resolve(Some("challenge-1")).await.unwrap();

        assert_eq!(controller.redirect_target(), Some("https://x"));
        assert!(controller.scope_rows(Locale::En).is_empty());
    }

    #[tokio::test]
    async fn unknown_scopes_are_listed_with_raw_fallback() {
        let service = StubService::default().on_fetch(ok_info(review_info()));
        let mut controller = ConsentController::new(service);
        controller.resolve(Some("challenge-1")).await.unwrap();

        assert_eq!(controller.client_name(), Some("demo-app"));
        let rows = controller.scope_rows(Locale::En);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Identity");
        assert_eq!(rows[1].name, "unknown:scope");
        assert_eq!(rows[1].description, "unknown:scope");
    }

    #[tokio::test]
    async fn provider_failure_on_fetch_is_terminal() {
        let service = StubService::default().on_fetch(Ok(ApiResponse {
            success: false,
            message: Some("challenge expired".into()),
            data: None,
        }));
        let mut controller = ConsentController::new(service);
        controller.resolve(Some("challenge-1")).await.unwrap();

        let ConsentState::Failed { message } = controller.state() else {
            panic!("expected Failed");
        };
        assert_eq!(message, "challenge expired");
    }

    #[tokio::test]
    async fn transport_failure_on_fetch_uses_generic_message() {
        let service = StubService::default()
            .on_fetch(Err(TransportError::message("connection refused")));
        let mut controller = ConsentController::new(service);
        controller.resolve(Some("challenge-1")).await.unwrap();

        let ConsentState::Failed { message } = controller.state() else {
            panic!("expected Failed");
        };
        assert_eq!(message, FETCH_FALLBACK);
    }

    #[tokio::test]
    async fn approve_with_redirect_reaches_redirecting() {
        let mut controller = ready_controller(Ok(ApiResponse {
            success: true,
            message: None,
            data: Some(RedirectData {
                redirect_to: Some("https://y".into()),
            }),
        }))
        .await;

        controller.approve(true).await.unwrap();
        assert_eq!(controller.redirect_target(), Some("https://y"));

        // The full requested list was granted, never a subset.
        let (scopes, remember) = controller
            .service
            .approved_with
            .lock()
            .unwrap()
            .clone()
            .unwrap();
        assert_eq!(scopes, ["openid", "unknown:scope"]);
        assert!(remember);
    }

    #[tokio::test]
    async fn failed_reject_returns_to_ready_with_message() {
        let mut controller = ready_controller(Ok(ApiResponse {
            success: false,
            message: Some("hydra unavailable".into()),
            data: None,
        }))
        .await;

        controller.reject(Some("changed my mind")).await.unwrap();
        assert!(matches!(controller.state(), ConsentState::Ready(_)));
        assert_eq!(controller.last_error(), Some("hydra unavailable"));
        assert_eq!(
            controller.service.rejected_with.lock().unwrap().clone(),
            Some(Some("changed my mind".to_string()))
        );
    }

    #[tokio::test]
    async fn success_without_redirect_is_a_soft_error() {
        let mut controller = ready_controller(Ok(ApiResponse {
            success: true,
            message: None,
            data: Some(RedirectData { redirect_to: None }),
        }))
        .await;

        controller.approve(false).await.unwrap();
        assert!(matches!(controller.state(), ConsentState::Ready(_)));
        assert_eq!(controller.last_error(), Some(NO_REDIRECT));
    }

    #[tokio::test]
    async fn transport_failure_on_submit_is_retryable() {
        let mut controller =
            ready_controller(Err(TransportError::message("timed out"))).await;

        controller.approve(true).await.unwrap();
        assert!(matches!(controller.state(), ConsentState::Ready(_)));
        assert_eq!(controller.last_error(), Some(APPROVE_FALLBACK));
    }

    #[tokio::test]
    async fn approve_outside_ready_is_an_invalid_state_error() {
        let service = StubService::default();
        let mut controller = ConsentController::new(service);
        let err = controller.approve(true).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidState(_)));
    }

    #[tokio::test]
    async fn resolve_twice_is_rejected() {
        let service = StubService::default().on_fetch(ok_info(review_info()));
        let mut controller = ConsentController::new(service);
        controller.resolve(Some("challenge-1")).await.unwrap();
        let err = controller.resolve(Some("challenge-2")).await.unwrap_err();
        assert!(matches!(err, ProbeError::InvalidState(_)));
    }
}
