//! Host-side half of the switcher handshake.
//!
//! The rendered widget reloads the page with a single query parameter. On the
//! next request the host parses it into a [`SwitchAction`], applies it to the
//! session, then renders the widget again.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn page(uri: Uri, State(app): State<AppState>) -> Result<SwitcherFragment> {
//!     let mut session = app.impersonation().await;
//!     if let Some(action) = SwitchAction::from_query(uri.query(), app.display.effective_param_name()) {
//!         action.apply(&mut session, &app.directory)?;
//!     }
//!     Ok(SwitcherFragment(app.renderer.render_directory(&app.directory, &session, &app.display)))
//! }
//! ```

use crate::directory::IdentityDirectory;
use crate::error::{Result, SwitcherError};
use crate::identity::UserId;
use crate::impersonation::ImpersonationSession;
use crate::render::STOP_VALUE;
use crate::traits::session::SessionHandle;
use axum::response::{Html, IntoResponse, Response};
use std::collections::HashMap;

/// What the widget asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchAction {
    /// Impersonate the identity whose identifier has this string form.
    Switch(String),
    /// Stop impersonating.
    Stop,
}

impl SwitchAction {
    /// Read the action from a raw query string.
    ///
    /// Returns `None` when the parameter is missing or blank, or the query
    /// string cannot be decoded.
    pub fn from_query(query: Option<&str>, param_name: &str) -> Option<Self> {
        let query = query?;
        let params: HashMap<String, String> = match serde_urlencoded::from_str(query) {
            Ok(params) => params,
            Err(err) => {
                tracing::debug!(error = %err, "Ignoring undecodable query string");
                return None;
            }
        };

        Self::from_value(params.get(param_name)?)
    }

    /// Interpret a single decoded parameter value.
    pub fn from_value(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else if value == STOP_VALUE {
            Some(Self::Stop)
        } else {
            Some(Self::Switch(value.to_string()))
        }
    }

    /// Apply the action to `session`.
    ///
    /// A switch must name an identity in `directory`; its typed identifier is
    /// what gets stored. Returns the identifier now impersonated, if any.
    ///
    /// # Errors
    ///
    /// [`SwitcherError::UnknownIdentity`] when the directory has no match,
    /// or whatever [`ImpersonationSession::impersonate`] rejects.
    pub fn apply<H, D>(
        self,
        session: &mut ImpersonationSession<H>,
        directory: &D,
    ) -> Result<Option<UserId>>
    where
        H: SessionHandle,
        D: IdentityDirectory + ?Sized,
    {
        match self {
            Self::Stop => {
                session.stop_impersonating();
                Ok(None)
            }
            Self::Switch(key) => {
                let identity = directory.find_by_key(&key).ok_or_else(|| {
                    tracing::warn!(
                        target: "impersonation.rejected",
                        reason = "unknown_identity",
                        user_id = %key,
                        "Impersonation rejected: identity not in directory"
                    );
                    SwitcherError::unknown_identity(key.clone())
                })?;

                let id = identity.id().clone();
                session.impersonate(id.clone())?;
                Ok(Some(id))
            }
        }
    }
}

/// Rendered switcher, served as `text/html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherFragment(pub String);

impl SwitcherFragment {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl IntoResponse for SwitcherFragment {
    fn into_response(self) -> Response {
        Html(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::identity::Identity;
    use crate::impersonation::ImpersonationReader;
    use crate::render::{DisplayConfig, SwitcherRenderer};
    use crate::session::RequestSession;
    use axum::http::{StatusCode, header};

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::from(vec![
            Identity::new(1, "Alice"),
            Identity::new("bob smith", "Bob"),
        ])
    }

    #[test]
    fn test_from_query() {
        assert_eq!(
            SwitchAction::from_query(Some("_switch_user=1"), "_switch_user"),
            Some(SwitchAction::Switch("1".to_string()))
        );
        assert_eq!(
            SwitchAction::from_query(Some("page=2&_switch_user=_stop"), "_switch_user"),
            Some(SwitchAction::Stop)
        );
        assert_eq!(
            SwitchAction::from_query(Some("page=2"), "_switch_user"),
            None
        );
        assert_eq!(SwitchAction::from_query(None, "_switch_user"), None);
        assert_eq!(
            SwitchAction::from_query(Some("_switch_user="), "_switch_user"),
            None
        );
    }

    #[test]
    fn test_from_query_decodes() {
        assert_eq!(
            SwitchAction::from_query(Some("as=bob%20smith"), "as"),
            Some(SwitchAction::Switch("bob smith".to_string()))
        );
        assert_eq!(
            SwitchAction::from_query(Some("as=bob+smith"), "as"),
            Some(SwitchAction::Switch("bob smith".to_string()))
        );
    }

    #[test]
    fn test_apply_switch_resolves_typed_id() {
        let mut session = ImpersonationSession::new(RequestSession::default());

        let id = SwitchAction::Switch("1".to_string())
            .apply(&mut session, &directory())
            .unwrap();

        assert_eq!(id, Some(UserId::Int(1)));
        assert_eq!(session.original_user_id().unwrap(), Some(UserId::Int(1)));
    }

    #[test]
    fn test_apply_unknown_identity() {
        let mut session = ImpersonationSession::new(RequestSession::default());

        let err = SwitchAction::Switch("42".to_string())
            .apply(&mut session, &directory())
            .unwrap_err();

        assert!(matches!(err, SwitcherError::UnknownIdentity(ref id) if id == "42"));
        assert!(!session.is_impersonating());
    }

    #[test]
    fn test_apply_stop() {
        let mut session = ImpersonationSession::new(RequestSession::default());
        session.impersonate("bob smith").unwrap();

        let id = SwitchAction::Stop.apply(&mut session, &directory()).unwrap();

        assert_eq!(id, None);
        assert!(!session.is_impersonating());
    }

    #[test]
    fn test_fragment_response_is_html() {
        let response = SwitcherFragment("<div></div>".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }

    #[test]
    fn test_blank_param_name_agrees_with_widget() {
        let display = DisplayConfig::new().param_name(" ");
        let session = ImpersonationSession::new(RequestSession::default());
        let html = SwitcherRenderer::new()
            .unwrap()
            .render_directory(&directory(), &session, &display);

        assert!(html.contains("data-param-name=\"_switch_user\""));
        assert_eq!(
            SwitchAction::from_query(Some("_switch_user=1"), display.effective_param_name()),
            Some(SwitchAction::Switch("1".to_string()))
        );
    }
}
