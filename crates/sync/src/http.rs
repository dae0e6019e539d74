//! HTTP client for the remote store.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use stockflow_inventory::{Movement, NewProduct, Product, ValidatedMovement};

use crate::config::SyncConfig;
use crate::remote::{RemoteError, RemoteStore};
use crate::wire::{MovementDto, NewMovementDto, ProductDto};

/// Remote store reached over HTTP/JSON.
///
/// List endpoints are retried with exponential backoff; creation endpoints
/// are sent exactly once.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    config: SyncConfig,
}

impl HttpRemote {
    pub fn new(config: SyncConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let url = self.config.endpoint(path);
        let mut delay = self.config.retry_backoff;
        let mut attempt = 0;

        loop {
            match self.get_once(&url).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && attempt < self.config.fetch_retries => {
                    attempt += 1;
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %err,
                        "fetch failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        let resp = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        decode(resp).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        tracing::debug!(url = %url, "POST");
        let resp = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RemoteError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(RemoteError::rejected(status.as_u16(), message));
    }
    resp.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Transport(e.to_string())
        }
    })
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        let dtos: Vec<ProductDto> = self.get_json("products").await?;
        dtos.into_iter()
            .map(|d| d.into_domain().map_err(RemoteError::from))
            .collect()
    }

    async fn create_product(&self, draft: &NewProduct) -> Result<Product, RemoteError> {
        let dto: ProductDto = self.post_json("products", draft).await?;
        Ok(dto.into_domain()?)
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, RemoteError> {
        let dtos: Vec<MovementDto> = self.get_json("movements").await?;
        dtos.into_iter()
            .map(|d| d.into_domain().map_err(RemoteError::from))
            .collect()
    }

    async fn create_movement(&self, movement: &ValidatedMovement) -> Result<Movement, RemoteError> {
        let body = NewMovementDto::new(movement, self.config.vocabulary);
        let dto: MovementDto = self.post_json("movements", &body).await?;
        Ok(dto.into_domain()?)
    }
}
