//! In-process authoritative store.
//!
//! Intended for tests/dev. Applies movements with its own arithmetic, can be
//! told to fail upcoming calls, and can record movements made by "another
//! actor" behind the client's back.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use stockflow_core::{Entity, MovementId, ProductId, position_of};
use stockflow_inventory::{
    Movement, MovementDetails, MovementType, NewProduct, Product, ProductRef, Quantity,
    ValidatedMovement,
};

use crate::remote::{RemoteError, RemoteStore};

#[derive(Debug, Default)]
struct ServerState {
    products: Vec<Product>,
    movements: Vec<Movement>,
}

#[derive(Debug, Default)]
struct Faults {
    fetch: VecDeque<RemoteError>,
    submit: VecDeque<RemoteError>,
}

#[derive(Debug, Default)]
pub struct InMemoryRemote {
    state: RwLock<ServerState>,
    faults: RwLock<Faults>,
    submit_gate: RwLock<Option<Arc<Notify>>>,
    fetch_gate: RwLock<Option<Arc<Notify>>>,
    submissions: AtomicUsize,
}

fn poisoned() -> RemoteError {
    RemoteError::Transport("lock poisoned".to_string())
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let remote = Self::new();
        if let Ok(mut state) = remote.state.write() {
            state.products.extend(products);
        }
        remote
    }

    /// Make the next list fetch fail with `err`. Calls queue up.
    pub fn fail_next_fetch(&self, err: RemoteError) {
        if let Ok(mut faults) = self.faults.write() {
            faults.fetch.push_back(err);
        }
    }

    /// Make the next movement submission fail with `err`. Calls queue up.
    pub fn fail_next_submission(&self, err: RemoteError) {
        if let Ok(mut faults) = self.faults.write() {
            faults.submit.push_back(err);
        }
    }

    /// Hold every movement submission until the returned handle is notified.
    pub fn hold_submissions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        if let Ok(mut slot) = self.submit_gate.write() {
            *slot = Some(gate.clone());
        }
        gate
    }

    /// Delay the response of the next product fetch until the returned handle
    /// is notified. The response carries the data read before the delay, like
    /// a slow network reply would.
    pub fn hold_next_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        if let Ok(mut slot) = self.fetch_gate.write() {
            *slot = Some(gate.clone());
        }
        gate
    }

    /// Number of movement submissions that reached the store.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn product(&self, id: &ProductId) -> Option<Product> {
        let state = self.state.read().ok()?;
        state.products.iter().find(|p| p.id() == id).cloned()
    }

    /// Record a movement made by another client, bypassing this client's
    /// projection entirely.
    pub fn record_external(
        &self,
        product_id: &ProductId,
        movement_type: MovementType,
        quantity: u32,
        responsible_user: &str,
    ) -> Result<Movement, RemoteError> {
        let quantity = Quantity::new(i64::from(quantity))
            .ok_or_else(|| RemoteError::rejected(422, "quantity must be positive"))?;
        let details = MovementDetails {
            movement_type,
            quantity,
            reason: "External adjustment".to_string(),
            responsible_user: responsible_user.to_string(),
            notes: None,
        };
        let mut state = self.state.write().map_err(|_| poisoned())?;
        commit(&mut state, product_id, details)
    }

    fn take_fault(&self, submit: bool) -> Result<(), RemoteError> {
        let mut faults = self.faults.write().map_err(|_| poisoned())?;
        let queue = if submit {
            &mut faults.submit
        } else {
            &mut faults.fetch
        };
        match queue.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Server-side movement application: reject what would go negative.
fn commit(
    state: &mut ServerState,
    product_id: &ProductId,
    details: MovementDetails,
) -> Result<Movement, RemoteError> {
    let idx = position_of(&state.products, product_id)
        .ok_or_else(|| RemoteError::rejected(404, format!("product {product_id} not found")))?;

    let product = &state.products[idx];
    let stock = product.current_stock();
    let qty = details.quantity.get();
    let next = if details.movement_type.decreases_stock() {
        stock.checked_sub(qty)
    } else {
        stock.checked_add(qty)
    }
    .ok_or_else(|| {
        RemoteError::rejected(422, format!("insufficient stock: {stock} available, {qty} requested"))
    })?;

    let updated = Product::new(
        product.id().clone(),
        product.sku(),
        product.name(),
        product.price(),
        next,
        product.minimum_stock(),
    )
    .map_err(|e| RemoteError::rejected(500, e.to_string()))?
    .with_category(product.category().map(str::to_string))
    .with_description(product.description().map(str::to_string))
    .with_image_url(product.image_url().map(str::to_string))
    .with_timestamps(product.created_at(), Some(Utc::now()));

    let movement = Movement::new(
        MovementId::generate(),
        ProductRef {
            id: updated.id().clone(),
            sku: updated.sku().to_string(),
            name: updated.name().to_string(),
        },
        details,
        Utc::now(),
    );

    state.products[idx] = updated;
    state.movements.push(movement.clone());
    Ok(movement)
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        self.take_fault(false)?;
        let products = self.state.read().map_err(|_| poisoned())?.products.clone();
        let gate = self.fetch_gate.write().map_err(|_| poisoned())?.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(products)
    }

    async fn create_product(&self, draft: &NewProduct) -> Result<Product, RemoteError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        draft
            .validate(&state.products)
            .map_err(|e| RemoteError::rejected(422, e.to_string()))?;

        let now = Utc::now();
        let product = Product::new(
            ProductId::generate(),
            draft.sku.trim(),
            draft.name.trim(),
            draft.price,
            draft.current_stock,
            draft.minimum_stock,
        )
        .map_err(|e| RemoteError::rejected(422, e.to_string()))?
        .with_category(draft.category.clone())
        .with_description(draft.description.clone())
        .with_image_url(draft.image_url.clone())
        .with_timestamps(Some(now), Some(now));

        state.products.push(product.clone());
        Ok(product)
    }

    async fn list_movements(&self) -> Result<Vec<Movement>, RemoteError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.movements.clone())
    }

    async fn create_movement(&self, movement: &ValidatedMovement) -> Result<Movement, RemoteError> {
        let gate = self.submit_gate.read().map_err(|_| poisoned())?.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.take_fault(true)?;
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.write().map_err(|_| poisoned())?;
        commit(&mut state, movement.product_id(), movement.details().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stockflow_inventory::{MovementRequest, validate};

    fn tee(stock: u32) -> Product {
        Product::new(ProductId::from(1), "CAM-001", "Black Tee", Decimal::new(2990, 2), stock, 5)
            .unwrap()
    }

    #[tokio::test]
    async fn submission_updates_server_stock_and_log() {
        let remote = InMemoryRemote::with_products([tee(10)]);
        let req = MovementRequest::new(ProductId::from(1), MovementType::Receipt, 5, "Purchase", "Ana");
        let validated = validate(&[tee(10)], &req).unwrap();

        let movement = remote.create_movement(&validated).await.unwrap();
        assert_eq!(movement.quantity().get(), 5);
        assert_eq!(remote.product(&ProductId::from(1)).unwrap().current_stock(), 15);
        assert_eq!(remote.list_movements().await.unwrap().len(), 1);
        assert_eq!(remote.submissions(), 1);
    }

    #[tokio::test]
    async fn server_refuses_to_go_negative() {
        let remote = InMemoryRemote::with_products([tee(2)]);
        let req = MovementRequest::new(ProductId::from(1), MovementType::Issue, 2, "Sale", "Ana");
        let validated = validate(&[tee(2)], &req).unwrap();
        remote
            .record_external(&ProductId::from(1), MovementType::Issue, 1, "Bruno")
            .unwrap();

        let err = remote.create_movement(&validated).await.unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { status: 422, .. }));
        assert_eq!(remote.product(&ProductId::from(1)).unwrap().current_stock(), 1);
    }

    #[tokio::test]
    async fn injected_faults_are_consumed_in_order() {
        let remote = InMemoryRemote::with_products([tee(1)]);
        remote.fail_next_fetch(RemoteError::Transport("down".to_string()));
        assert!(remote.list_products().await.is_err());
        assert_eq!(remote.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_sku_is_rejected_by_the_store() {
        let remote = InMemoryRemote::with_products([tee(1)]);
        let draft = NewProduct {
            sku: "cam-001".to_string(),
            name: "Copy".to_string(),
            price: Decimal::ONE,
            current_stock: 0,
            minimum_stock: 0,
            category: None,
            description: None,
            image_url: None,
        };
        let err = remote.create_product(&draft).await.unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { status: 422, .. }));
    }
}
