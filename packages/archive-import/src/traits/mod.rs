//! Collaborator seams consumed by the import pipeline.
//!
//! The crate owns extraction and orchestration; the network, the record
//! store, authorization, and notification all arrive through these traits.

pub mod auth;
pub mod fetcher;
pub mod notify;
pub mod store;

pub use auth::AgentAuthorizer;
pub use fetcher::{Fetcher, HttpFetcher, PoliteFetcher};
pub use notify::{ClaimNotifier, NoopNotifier};
pub use store::{StoredWork, WorkStore};
