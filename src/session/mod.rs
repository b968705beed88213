//! Session management and storage.
//!
//! Provides the per-request [`RequestSession`] handle and an in-memory
//! persistent store.

mod config;
mod in_memory;
mod request;

pub use config::SessionConfig;
pub use in_memory::InMemorySessionStore;
pub use request::RequestSession;
