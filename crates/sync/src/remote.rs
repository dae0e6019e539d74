//! The remote store the engine reconciles against.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockflow_inventory::{Movement, NewProduct, Product, ValidatedMovement};

use crate::wire::WireError;

/// Failure talking to the remote store.
///
/// `Transport` and `Decode` mean the exchange itself failed; `Rejected` means
/// the store answered with a non-success status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl RemoteError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Whether repeating an idempotent request may help.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::Decode(_) => false,
            RemoteError::Rejected { status, .. } => *status >= 500,
        }
    }
}

impl From<WireError> for RemoteError {
    fn from(err: WireError) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

/// Authoritative product and movement collections.
///
/// `create_*` calls are not idempotent; callers must not retry them blindly.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError>;

    async fn create_product(&self, draft: &NewProduct) -> Result<Product, RemoteError>;

    async fn list_movements(&self) -> Result<Vec<Movement>, RemoteError>;

    async fn create_movement(&self, movement: &ValidatedMovement) -> Result<Movement, RemoteError>;
}

#[async_trait]
impl<T> RemoteStore for Arc<T>
where
    T: RemoteStore + ?Sized,
{
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        (**self).list_products().await
    }

    async fn create_product(&self, draft: &NewProduct) -> Result<Product, RemoteError> {
        (**self).create_product(draft).await
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, RemoteError> {
        (**self).list_movements().await
    }

    async fn create_movement(&self, movement: &ValidatedMovement) -> Result<Movement, RemoteError> {
        (**self).create_movement(movement).await
    }
}
