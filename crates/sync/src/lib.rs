//! Client-side synchronization with the authoritative stock store.
//!
//! - `wire`: JSON shapes of the remote API and their translation to domain types
//! - `remote`: the remote store seam, with an HTTP and an in-process implementation
//! - `controller`: optimistic apply, submit, refetch-or-rollback

pub mod config;
pub mod controller;
pub mod http;
pub mod in_memory;
pub mod projection;
pub mod remote;
pub mod wire;

pub use config::SyncConfig;
pub use controller::{
    Clock, ControllerSnapshot, FixedClock, Reconciliation, ReconciliationController,
    RefreshOutcome, Rejection, SubmissionPhase, SubmitOutcome, SyncError, SystemClock,
};
pub use http::HttpRemote;
pub use in_memory::InMemoryRemote;
pub use projection::{DerivedViews, Projection};
pub use remote::{RemoteError, RemoteStore};
pub use wire::{MovementVocabulary, WireError};
