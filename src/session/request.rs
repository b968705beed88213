//! Per-request session handle.
//!
//! A [`RequestSession`] is loaded from a [`SessionStore`] at the start of a
//! request, mutated through [`SessionHandle`], and committed back at the end.
//! Rotating the token only swaps the id in memory; the old id is removed from
//! the store on [`RequestSession::commit`].

use crate::error::Result;
use crate::session::SessionConfig;
use crate::traits::session::{SessionData, SessionHandle, SessionStore};
use std::time::Duration;

/// Session state for a single request.
#[derive(Debug, Clone)]
pub struct RequestSession {
    id: String,
    data: SessionData,
    /// Id the session was loaded under, kept until commit once rotated.
    retired_id: Option<String>,
}

impl RequestSession {
    /// Start a fresh session with a random id.
    pub fn new(ttl: Duration) -> Self {
        Self {
            id: generate_session_id(),
            data: SessionData::new(ttl),
            retired_id: None,
        }
    }

    /// Load the session stored under `session_id`, or start a fresh one when
    /// it is missing or expired.
    pub async fn load<S>(store: &S, session_id: &str, ttl: Duration) -> Result<Self>
    where
        S: SessionStore + ?Sized,
    {
        match store.load(session_id).await? {
            Some(data) => Ok(Self {
                id: session_id.to_string(),
                data,
                retired_id: None,
            }),
            None => Ok(Self::new(ttl)),
        }
    }

    /// Persist the session under its current id.
    ///
    /// Returns the id the client must present on its next request.
    pub async fn commit<S>(self, store: &S) -> Result<String>
    where
        S: SessionStore + ?Sized,
    {
        let Self {
            id,
            data,
            retired_id,
        } = self;

        // The old id stays valid until the new one is stored.
        store.save(&id, data).await?;
        if let Some(ref retired) = retired_id {
            store.delete(retired).await?;
        }

        tracing::debug!(
            target: "session.committed",
            session_id = %id,
            rotated = retired_id.is_some(),
            "Session committed"
        );

        Ok(id)
    }

    /// Current session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the id changed since the session was loaded.
    pub fn was_rotated(&self) -> bool {
        self.retired_id.is_some()
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }
}

impl Default for RequestSession {
    fn default() -> Self {
        Self::new(SessionConfig::default().default_ttl())
    }
}

impl SessionHandle for RequestSession {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: serde_json::Value) {
        self.data.set(key, value);
    }

    fn delete(&mut self, key: &str) {
        self.data.remove(key);
    }

    fn rotate_token(&mut self) {
        let new_id = generate_session_id();
        let old_id = std::mem::replace(&mut self.id, new_id);
        // Only the id known to the store needs retiring; intermediate ids
        // from repeated rotations were never persisted.
        if self.retired_id.is_none() {
            self.retired_id = Some(old_id);
        }

        tracing::debug!(target: "session.rotated", "Session token rotated");
    }
}

fn generate_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
