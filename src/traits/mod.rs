//! Trait definitions for extensible components
//!
//! These traits allow users to swap implementations or provide their own
//! session handles and session storage.

pub mod session;
