//! User switcher widget.
//!
//! Renders a self-contained HTML fragment (styles, markup and a small inline
//! script) listing the switchable identities. Picking an identity reloads the
//! current page with the configured query parameter set to its identifier, or
//! to [`STOP_VALUE`] for the stop entry; see [`crate::http::SwitchAction`] for
//! the receiving side.
//!
//! Every dynamic value goes through the template engine's HTML escaping and
//! reaches the script only via `data-*` attributes.

mod config;

pub use config::{DEFAULT_PARAM_NAME, DEFAULT_Z_INDEX, DisplayConfig, Position};

use crate::directory::IdentityDirectory;
use crate::error::Result;
use crate::identity::{Identity, UserId};
use crate::impersonation::ImpersonationReader;
use handlebars::Handlebars;
use serde::Serialize;

/// Parameter value asking the host to stop impersonating.
pub const STOP_VALUE: &str = "_stop";

const TEMPLATE_NAME: &str = "switcher";
const TEMPLATE: &str = include_str!("templates/switcher.hbs");

#[derive(Serialize)]
struct SwitcherView<'a> {
    position: &'static str,
    position_css: &'static str,
    z_index: i64,
    param_name: &'a str,
    stop_value: &'static str,
    impersonating: bool,
    button_text: &'static str,
    items: Vec<ItemView>,
}

#[derive(Serialize)]
struct ItemView {
    id: String,
    name: String,
    active: bool,
}

/// Renders the switcher fragment.
pub struct SwitcherRenderer {
    handlebars: Handlebars<'static>,
}

impl SwitcherRenderer {
    /// Create a renderer with the embedded template.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::html_escape);
        handlebars.register_template_string(TEMPLATE_NAME, TEMPLATE)?;

        Ok(Self { handlebars })
    }

    /// Render the widget for `candidates`.
    ///
    /// Returns an empty string when there are no candidates, without
    /// consulting `session`. The session's stored identifier is only read
    /// when `config.current_user_id` is unset. Never fails: a corrupt session
    /// value just means nothing is highlighted.
    pub fn render(
        &self,
        candidates: &[Identity],
        session: &dyn ImpersonationReader,
        config: &DisplayConfig,
    ) -> String {
        if candidates.is_empty() {
            return String::new();
        }

        let current_id = match &config.current_user_id {
            Some(id) => Some(id.clone()),
            None => session.original_user_id().unwrap_or_else(|err| {
                tracing::warn!(
                    target: "impersonation.corrupt_state",
                    error = %err,
                    "Ignoring unreadable impersonation state while rendering"
                );
                None
            }),
        };
        let impersonating = session.is_impersonating();

        let items = candidates
            .iter()
            .map(|identity| ItemView {
                id: identity.id().canonical(),
                name: identity.display_name().to_string(),
                active: is_current(identity.id(), current_id.as_ref()),
            })
            .collect();

        let view = SwitcherView {
            position: config.position.as_str(),
            position_css: config.position.css(),
            z_index: config.z_index,
            param_name: config.effective_param_name(),
            stop_value: STOP_VALUE,
            impersonating,
            button_text: if impersonating {
                "Stop Impersonating"
            } else {
                "Switch User"
            },
            items,
        };

        match self.handlebars.render(TEMPLATE_NAME, &view) {
            Ok(html) => html,
            Err(err) => {
                tracing::error!(error = %err, "Failed to render user switcher");
                String::new()
            }
        }
    }

    /// List `directory` and render it.
    pub fn render_directory(
        &self,
        directory: &dyn IdentityDirectory,
        session: &dyn ImpersonationReader,
        config: &DisplayConfig,
    ) -> String {
        self.render(&directory.list(), session, config)
    }
}

fn is_current(id: &UserId, current: Option<&UserId>) -> bool {
    current.is_some_and(|current| current.same_as(id))
}
