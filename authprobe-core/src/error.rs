/// Errors surfaced by the authprobe crates.
///
/// Probe outcomes themselves are never errors: a 4xx/5xx response is ordinary
/// data in this tool. This enum covers the cases where no usable response
/// exists or the caller misused a flow object.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// A provider-issued challenge parameter was required but absent.
    #[error("missing {0} parameter")]
    MissingChallenge(&'static str),
    /// A resource-API call was attempted without a bearer token.
    #[error("bearer token is required")]
    MissingToken,
    /// A flow operation was invoked from a state that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    /// A URL could not be constructed or parsed.
    #[error("invalid url: {0}")]
    Url(String),
}
