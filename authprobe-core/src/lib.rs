//! # Authprobe Core
//!
//! `authprobe-core` provides the shared types for the authprobe diagnostic
//! toolkit: the provider's JSON response envelope, the consent-flow payloads,
//! the scope descriptor catalog and the common error enum used across the
//! workspace.

#![warn(missing_docs)]

/// Errors that can occur while driving the provider.
pub mod error;

/// The provider's JSON envelope and flow payloads.
pub mod response;

/// Static scope descriptor catalog.
pub mod scope;

pub use error::ProbeError;
pub use response::{ApiResponse, ClientRegistration, ConsentInfo, RedirectData, TokenCreation};
pub use scope::{describe_scope, Locale, ScopeDescriptor, ScopeIcon};
