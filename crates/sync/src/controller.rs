//! Reconciliation controller.
//!
//! Owns the local projection and drives each movement submission through
//! `Idle → Validating → OptimisticallyApplied → Submitting → {Reconciled | RolledBack} → Idle`:
//!
//! 1. validate against the local projection (no mutation on failure)
//! 2. apply through the ledger and re-derive views immediately
//! 3. send the movement to the remote store, once
//! 4. on success refetch everything and replace local state wholesale;
//!    on failure restore the pre-submission state
//!
//! Only one submission may be in flight, and a dropped `submit` future still
//! returns the controller to `Idle`. Refreshes are tagged with a
//! monotonic sequence number so a slow response can never overwrite newer
//! state, and after [`ReconciliationController::detach`] responses are dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use thiserror::Error;

use stockflow_core::{DomainError, Entity, ProductId};
use stockflow_dashboard::{DashboardStats, StockAlert};
use stockflow_inventory::{
    Movement, MovementRequest, MovementType, NewProduct, Product, ValidationError, ledger, validate,
};

use crate::projection::{DerivedViews, Projection};
use crate::remote::{RemoteError, RemoteStore};

/// Source of "now" for day-boundary computations, in the viewer's zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the machine's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Validating,
    OptimisticallyApplied,
    Submitting,
    Reconciled,
    RolledBack,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("controller has been detached")]
    Detached,
}

/// Why a submission was refused before anything was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("another submission is in flight")]
    Busy,

    #[error("controller has been detached")]
    Detached,
}

/// What happened after the remote store accepted a movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Local state now mirrors a fetch issued after the submission.
    Confirmed,
    /// The refetch failed; the optimistic projection stays, flagged tentative,
    /// until the next successful refresh.
    Deferred(RemoteError),
    /// The controller was detached meanwhile; nothing was applied.
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted {
        movement: Movement,
        reconciliation: Reconciliation,
    },
    Rejected(Rejection),
    RolledBack(SyncError),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer refresh had already been applied; this response was dropped.
    Stale,
    /// The controller is detached; nothing was applied.
    Ignored,
}

/// Point-in-time copy of everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub products: Vec<Product>,
    pub stats: DashboardStats,
    pub alerts: Vec<StockAlert>,
    pub phase: SubmissionPhase,
    pub tentative: bool,
}

struct Checkpoint {
    projection: Projection,
    views: DerivedViews,
    tentative: bool,
    generation: u64,
}

struct State {
    phase: SubmissionPhase,
    projection: Projection,
    views: DerivedViews,
    /// Local state contains changes not yet confirmed by a refetch.
    tentative: bool,
    /// Bumped on every authoritative replacement.
    generation: u64,
    issued_refresh: u64,
    applied_refresh: u64,
    detached: bool,
}

impl State {
    fn transition(&mut self, next: SubmissionPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "submission phase");
        self.phase = next;
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            projection: self.projection.clone(),
            views: self.views.clone(),
            tentative: self.tentative,
            generation: self.generation,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.projection = checkpoint.projection;
        self.views = checkpoint.views;
        self.tentative = checkpoint.tentative;
    }

    /// Undo an optimistic apply whose submission did not go through, unless a
    /// refresh has already replaced the projection since.
    fn abandon(&mut self, checkpoint: Checkpoint, cause: &dyn std::fmt::Display) {
        if self.detached {
            self.transition(SubmissionPhase::Idle);
            return;
        }
        if self.generation == checkpoint.generation {
            self.restore(checkpoint);
            tracing::warn!(error = %cause, "submission failed; optimistic change rolled back");
        } else {
            tracing::warn!(error = %cause, "submission failed; projection already refreshed");
        }
        self.transition(SubmissionPhase::RolledBack);
        self.transition(SubmissionPhase::Idle);
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks one submission from the optimistic apply until it settles.
///
/// If the `submit` future is dropped before that (timeout, `select!`, a torn
/// down view), `Drop` puts the controller back to `Idle`: before the store
/// answered the optimistic change is abandoned like a failed submission,
/// after it accepted the projection stays tentative until the next refresh.
struct InFlight<'a> {
    state: &'a Mutex<State>,
    /// Present until the remote store has answered.
    checkpoint: Option<Checkpoint>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<State>, checkpoint: Checkpoint) -> Self {
        Self {
            state,
            checkpoint: Some(checkpoint),
            settled: false,
        }
    }

    fn accepted(&mut self) {
        self.checkpoint = None;
    }

    fn roll_back(mut self, err: &RemoteError) {
        self.settled = true;
        if let Some(checkpoint) = self.checkpoint.take() {
            lock(self.state).abandon(checkpoint, err);
        }
    }

    fn reconciled(mut self) {
        self.settled = true;
        let mut state = lock(self.state);
        state.transition(SubmissionPhase::Reconciled);
        state.transition(SubmissionPhase::Idle);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = lock(self.state);
        match self.checkpoint.take() {
            Some(checkpoint) => {
                state.abandon(checkpoint, &"submission cancelled before the store answered")
            }
            None => {
                tracing::warn!("reconciliation cancelled; projection stays tentative");
                state.transition(SubmissionPhase::Idle);
            }
        }
    }
}

pub struct ReconciliationController<R> {
    remote: R,
    clock: Box<dyn Clock>,
    state: Mutex<State>,
}

impl<R: RemoteStore> ReconciliationController<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            clock: Box::new(SystemClock),
            state: Mutex::new(State {
                phase: SubmissionPhase::Idle,
                projection: Projection::default(),
                views: DerivedViews::default(),
                tentative: false,
                generation: 0,
                issued_refresh: 0,
                applied_refresh: 0,
                detached: false,
            }),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    // The state is only ever held between await points, never across one.
    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    pub fn products(&self) -> Vec<Product> {
        self.state().projection.products().to_vec()
    }

    pub fn movements(&self) -> Vec<Movement> {
        self.state().projection.movements().to_vec()
    }

    pub fn stats(&self) -> DashboardStats {
        self.state().views.stats.clone()
    }

    pub fn alerts(&self) -> Vec<StockAlert> {
        self.state().views.alerts.clone()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state().phase
    }

    pub fn is_tentative(&self) -> bool {
        self.state().tentative
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let state = self.state();
        ControllerSnapshot {
            products: state.projection.products().to_vec(),
            stats: state.views.stats.clone(),
            alerts: state.views.alerts.clone(),
            phase: state.phase,
            tentative: state.tentative,
        }
    }

    /// Stock a product would have after a prospective movement.
    pub fn preview(
        &self,
        product_id: &ProductId,
        movement_type: MovementType,
        quantity: i64,
    ) -> Option<i64> {
        let state = self.state();
        state
            .projection
            .product(product_id)
            .map(|p| ledger::projected_stock(p, movement_type, quantity))
    }

    /// Stop applying responses. In-flight requests complete but their results
    /// are dropped, and new submissions are refused.
    pub fn detach(&self) {
        let mut state = self.state();
        if !state.detached {
            tracing::info!("reconciliation controller detached");
        }
        state.detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.state().detached
    }

    /// Fetch authoritative products and movements and replace local state.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RemoteError> {
        let seq = {
            let mut state = self.state();
            if state.detached {
                return Ok(RefreshOutcome::Ignored);
            }
            state.issued_refresh += 1;
            state.issued_refresh
        };

        let (products, movements) =
            tokio::try_join!(self.remote.list_products(), self.remote.list_movements())?;
        let now = self.clock.now();

        let mut state = self.state();
        if state.detached {
            tracing::debug!(seq, "dropping refresh response after detach");
            return Ok(RefreshOutcome::Ignored);
        }
        if seq <= state.applied_refresh {
            tracing::warn!(seq, applied = state.applied_refresh, "dropping stale refresh response");
            return Ok(RefreshOutcome::Stale);
        }

        state.applied_refresh = seq;
        state.projection = Projection::new(products, movements);
        state.views = DerivedViews::derive(&state.projection, &now);
        state.tentative = false;
        state.generation += 1;

        tracing::info!(
            seq,
            products = state.projection.products().len(),
            movements = state.projection.movements().len(),
            "projection replaced from remote"
        );
        Ok(RefreshOutcome::Applied)
    }

    /// Validate, apply optimistically, submit, then reconcile or roll back.
    pub async fn submit(&self, request: MovementRequest) -> SubmitOutcome {
        let (validated, checkpoint) = {
            let mut state = self.state();
            if state.detached {
                return SubmitOutcome::Rejected(Rejection::Detached);
            }
            if state.phase != SubmissionPhase::Idle {
                tracing::warn!(phase = ?state.phase, "submission refused: another one is in flight");
                return SubmitOutcome::Rejected(Rejection::Busy);
            }

            state.transition(SubmissionPhase::Validating);
            let validated = match validate(state.projection.products(), &request) {
                Ok(v) => v,
                Err(err) => {
                    tracing::debug!(error = %err, "movement rejected by validation");
                    state.transition(SubmissionPhase::Idle);
                    return SubmitOutcome::Rejected(Rejection::Invalid(err));
                }
            };

            let checkpoint = state.checkpoint();
            if let Err(err) = state.projection.apply(&validated) {
                tracing::error!(error = %err, "ledger refused a validated movement");
                state.restore(checkpoint);
                state.transition(SubmissionPhase::Idle);
                return SubmitOutcome::RolledBack(SyncError::Domain(err));
            }
            let now = self.clock.now();
            state.views = DerivedViews::derive(&state.projection, &now);
            state.tentative = true;
            state.transition(SubmissionPhase::OptimisticallyApplied);
            state.transition(SubmissionPhase::Submitting);
            (validated, checkpoint)
        };

        let mut in_flight = InFlight::new(&self.state, checkpoint);
        let movement = match self.remote.create_movement(&validated).await {
            Ok(movement) => movement,
            Err(err) => {
                in_flight.roll_back(&err);
                return SubmitOutcome::RolledBack(SyncError::Remote(err));
            }
        };
        in_flight.accepted();

        tracing::info!(
            movement_id = %movement.id(),
            product_id = %validated.product_id(),
            "movement accepted by remote store"
        );

        let reconciliation = match self.refresh().await {
            Ok(RefreshOutcome::Applied) | Ok(RefreshOutcome::Stale) => Reconciliation::Confirmed,
            Ok(RefreshOutcome::Ignored) => Reconciliation::Detached,
            Err(err) => {
                tracing::warn!(error = %err, "refetch after submission failed; keeping optimistic state");
                Reconciliation::Deferred(err)
            }
        };

        in_flight.reconciled();

        SubmitOutcome::Accepted {
            movement,
            reconciliation,
        }
    }

    /// Forward a product draft to the remote store, then refresh.
    pub async fn create_product(&self, draft: NewProduct) -> Result<Product, SyncError> {
        {
            let state = self.state();
            if state.detached {
                return Err(SyncError::Detached);
            }
            draft.validate(state.projection.products())?;
        }

        let product = self.remote.create_product(&draft).await?;
        tracing::info!(sku = %product.sku(), "product created");

        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %err, "refresh after product creation failed");
        }
        Ok(product)
    }
}
