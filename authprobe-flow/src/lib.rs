//! # Authprobe Flow
//!
//! `authprobe-flow` carries the two mechanisms every surface of the console
//! is built on:
//!
//! - **[`Tracker`]**: a keyed registry of independent endpoint probes, each
//!   with its own in-flight flag and last result. Probes never block or
//!   overwrite each other; failures are normalized into data rather than
//!   raised.
//! - **[`ConsentController`]**: an explicit state machine driving the
//!   three-step consent handshake (challenge → decision → redirect),
//!   including the provider's "already trusted / already consented"
//!   external-redirect escape hatch.

#![warn(missing_docs)]

/// Consent flow state machine.
pub mod consent;
/// Keyed endpoint call tracking.
pub mod tracker;

pub use consent::{ConsentController, ConsentService, ConsentState, ProviderConsent};
pub use tracker::{CallResult, Tracker};
