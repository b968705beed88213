//! Session-backed impersonation.
//!
//! Lets an already-authorized operator act as another user. The impersonated
//! identifier is kept under a single key in the request's session; every
//! transition rotates the session token and notifies the optional audit sink.
//!
//! Whether the operator may impersonate the target is the caller's decision,
//! as is checking that the target exists.
//!
//! # Tracing Events
//!
//! - `impersonation.started` - identifier written to the session
//! - `impersonation.stopped` - identifier cleared from the session
//! - `impersonation.rejected` - identifier failed validation
//!
//! # Example
//!
//! ```rust,ignore
//! use switchboard::{ImpersonationSession, RequestSession, TracingAuditSink};
//! use std::sync::Arc;
//!
//! let mut session = ImpersonationSession::new(RequestSession::default())
//!     .with_audit_sink(Arc::new(TracingAuditSink));
//!
//! session.impersonate("user-456")?;
//! assert!(session.is_impersonating());
//!
//! session.stop_impersonating();
//! assert_eq!(session.original_user_id()?, None);
//! ```

use crate::audit::AuditSink;
use crate::error::{Result, SwitcherError};
use crate::identity::UserId;
use crate::traits::session::SessionHandle;
use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session key used when none is configured.
pub const DEFAULT_SESSION_KEY: &str = "generic_user_switcher_impersonator";

/// Maximum length of a textual identifier, in bytes after trimming.
const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Configuration for impersonation behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpersonationConfig {
    /// Session key holding the impersonated identifier.
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

impl Default for ImpersonationConfig {
    fn default() -> Self {
        Self {
            session_key: default_session_key(),
        }
    }
}

impl ImpersonationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session key.
    #[must_use]
    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(key) = get_env_with_prefix("IMPERSONATION_SESSION_KEY") {
            if !key.trim().is_empty() {
                config.session_key = key;
            }
        }

        config
    }
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

/// Current impersonation state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpersonationState {
    NotImpersonating,
    ImpersonatingAs(UserId),
}

impl ImpersonationState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::ImpersonatingAs(_))
    }
}

/// Read side of an impersonation session.
///
/// The renderer only sees this trait.
pub trait ImpersonationReader {
    /// Whether anything is stored under the impersonation key.
    ///
    /// The stored value is not type-checked here.
    fn is_impersonating(&self) -> bool;

    /// The stored identifier, if any.
    ///
    /// Fails with [`SwitcherError::CorruptSessionState`] when the stored value
    /// is neither a string nor an integer.
    fn original_user_id(&self) -> Result<Option<UserId>>;

    /// Both reads folded into a single state value.
    fn state(&self) -> Result<ImpersonationState> {
        Ok(match self.original_user_id()? {
            Some(id) => ImpersonationState::ImpersonatingAs(id),
            None => ImpersonationState::NotImpersonating,
        })
    }
}

/// Impersonation state machine over a session handle.
pub struct ImpersonationSession<H: SessionHandle> {
    handle: H,
    key: String,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<H: SessionHandle> ImpersonationSession<H> {
    /// Create a session using the default key and no audit sink.
    #[must_use]
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            key: default_session_key(),
            audit: None,
        }
    }

    /// Create a session from configuration.
    #[must_use]
    pub fn with_config(handle: H, config: &ImpersonationConfig) -> Self {
        Self::new(handle).with_key(config.session_key.clone())
    }

    /// Use a different session key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Notify `sink` on every start and stop.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Start impersonating `identifier`.
    ///
    /// Textual identifiers are trimmed and must be non-empty and at most 255
    /// bytes long; integers are stored as they are. Calling this again, even
    /// with the same identifier, rewrites the value, rotates the token and
    /// notifies the sink again.
    ///
    /// # Errors
    ///
    /// Returns [`SwitcherError::InvalidIdentifier`] before touching the session
    /// when validation fails.
    pub fn impersonate(&mut self, identifier: impl Into<UserId>) -> Result<()> {
        let identifier = validate_identifier(identifier.into())?;

        self.handle.set(&self.key, identifier.to_value());
        self.handle.rotate_token();

        if let Some(sink) = &self.audit {
            sink.on_impersonation_started(&identifier);
        }

        tracing::info!(
            target: "impersonation.started",
            session_key = %self.key,
            user_id = %identifier,
            "Impersonation started"
        );

        Ok(())
    }

    /// Stop impersonating.
    ///
    /// The sink hears about it before the key is cleared. Safe to call when
    /// not impersonating; the same sequence runs.
    pub fn stop_impersonating(&mut self) {
        if let Some(sink) = &self.audit {
            sink.on_impersonation_stopped();
        }

        self.handle.delete(&self.key);
        self.handle.rotate_token();

        tracing::info!(
            target: "impersonation.stopped",
            session_key = %self.key,
            "Impersonation stopped"
        );
    }

    /// The session key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Raw value under the key. A stored JSON `null` counts as absent.
    fn stored_value(&self) -> Option<serde_json::Value> {
        self.handle.get(&self.key).filter(|value| !value.is_null())
    }

    /// Give the handle back, e.g. to commit it to a store.
    #[must_use]
    pub fn into_handle(self) -> H {
        self.handle
    }
}

impl<H: SessionHandle> ImpersonationReader for ImpersonationSession<H> {
    fn is_impersonating(&self) -> bool {
        self.stored_value().is_some()
    }

    fn original_user_id(&self) -> Result<Option<UserId>> {
        match self.stored_value() {
            None => Ok(None),
            Some(value) => UserId::from_value(&value)
                .map(Some)
                .ok_or_else(|| SwitcherError::corrupt_session_state(self.key.clone())),
        }
    }
}

fn validate_identifier(identifier: UserId) -> Result<UserId> {
    let text = match identifier {
        UserId::Text(text) => text,
        other => return Ok(other),
    };

    let trimmed = text.trim();

    if trimmed.is_empty() {
        tracing::warn!(
            target: "impersonation.rejected",
            reason = "empty_identifier",
            "Impersonation rejected: empty identifier"
        );
        return Err(SwitcherError::invalid_identifier(
            "User identifier cannot be empty.",
        ));
    }

    if trimmed.len() > MAX_IDENTIFIER_LENGTH {
        tracing::warn!(
            target: "impersonation.rejected",
            reason = "identifier_too_long",
            length = trimmed.len(),
            "Impersonation rejected: identifier too long"
        );
        return Err(SwitcherError::invalid_identifier(format!(
            "User identifier cannot exceed {MAX_IDENTIFIER_LENGTH} characters."
        )));
    }

    Ok(UserId::Text(trimmed.to_string()))
}
