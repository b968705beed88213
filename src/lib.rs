//! Switchboard - session-backed user impersonation for Axum applications
//!
//! Lets an already-authorized operator temporarily act as another user, and
//! renders a drop-in widget for picking who to become.
//!
//! # Features
//!
//! - **Impersonation**: start/stop/query state kept under one session key,
//!   with token rotation on every transition and optional audit hooks
//! - **Directory**: pluggable source of switchable identities
//! - **Widget**: self-contained HTML fragment with search and highlighting
//! - **Handshake**: parse the widget's query parameter and apply it
//! - **Sessions**: per-request handle with pluggable persistent storage
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use switchboard::{
//!     DisplayConfig, Identity, ImpersonationSession, InMemoryDirectory, RequestSession,
//!     SwitchAction, SwitcherRenderer,
//! };
//!
//! let directory = InMemoryDirectory::from(vec![
//!     Identity::new(1, "Alice"),
//!     Identity::new(2, "Bob"),
//! ]);
//! let renderer = SwitcherRenderer::new()?;
//! let display = DisplayConfig::default();
//!
//! let mut session = ImpersonationSession::new(RequestSession::default());
//! if let Some(action) = SwitchAction::from_query(Some("_switch_user=2"), display.effective_param_name()) {
//!     action.apply(&mut session, &directory)?;
//! }
//!
//! let html = renderer.render_directory(&directory, &session, &display);
//! ```

mod audit;
mod config;
mod directory;
mod error;
pub mod http;
mod identity;
mod impersonation;
pub mod render;
pub mod session;
pub mod traits;
pub mod utils;

// Re-exports for public API
pub use audit::{AuditSink, TracingAuditSink};
#[cfg(feature = "test-helpers")]
pub use audit::test::{AuditEvent, RecordingAuditSink};
pub use config::{Config, ConfigBuilder, LoggingConfig};
pub use directory::{IdentityDirectory, InMemoryDirectory};
pub use error::{ErrorResponse, Result, SwitcherError};
pub use http::{SwitchAction, SwitcherFragment};
pub use identity::{Identity, UserId};
pub use impersonation::{
    DEFAULT_SESSION_KEY, ImpersonationConfig, ImpersonationReader, ImpersonationSession,
    ImpersonationState,
};
pub use render::{DisplayConfig, Position, STOP_VALUE, SwitcherRenderer};
pub use session::{InMemorySessionStore, RequestSession, SessionConfig};
pub use traits::session::{SessionData, SessionHandle, SessionStore};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "impersonation=debug")
/// - `SWITCHBOARD_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("SWITCHBOARD_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
