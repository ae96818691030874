use crate::application::validation;
use crate::domain::booking::{
    Booking, BookingRequest, BookingStatus, IdempotencyOutcome, IdempotencyRecord,
};
use crate::domain::catalog::{Station, Train, Weekday};
use crate::domain::ports::{
    BookingLedgerBox, CatalogStoreBox, ChargeOutcome, IdempotencyStoreBox,
    PaymentGatewayBox, RefundNotifierBox, RefundRequested,
};
use crate::error::{BookingError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on a single payment gateway call. On expiry the booking is
    /// marked failed and the token is free to retry.
    pub payment_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            payment_timeout: Duration::from_secs(10),
        }
    }
}

/// Serializes submissions that share an idempotency token. Holding the
/// per-token guard across the whole submit path guarantees at most one
/// payment attempt is in flight per token.
#[derive(Default)]
struct TokenLocks {
    inner: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TokenLocks {
    fn for_token(&self, token: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().expect("token lock map poisoned");
        map.entry(token.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// The booking transaction core.
///
/// Owns its collaborators as boxed ports, injected at construction: the
/// read-only catalog, the booking ledger, the idempotency record store, the
/// payment gateway, and the refund notifier.
pub struct BookingEngine {
    catalog: CatalogStoreBox,
    ledger: BookingLedgerBox,
    idempotency: IdempotencyStoreBox,
    gateway: PaymentGatewayBox,
    refunds: RefundNotifierBox,
    config: EngineConfig,
    token_locks: TokenLocks,
}

impl BookingEngine {
    pub fn new(
        catalog: CatalogStoreBox,
        ledger: BookingLedgerBox,
        idempotency: IdempotencyStoreBox,
        gateway: PaymentGatewayBox,
        refunds: RefundNotifierBox,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            ledger,
            idempotency,
            gateway,
            refunds,
            config,
            token_locks: TokenLocks::default(),
        }
    }

    /// Submits a booking request with exactly-once semantics under retry.
    ///
    /// A token whose previous attempt confirmed returns the recorded booking
    /// without touching the gateway. A token whose previous attempt failed is
    /// treated as a fresh retry. Every path past the pending write resolves
    /// the booking to a terminal status.
    pub async fn submit(&self, request: BookingRequest) -> Result<Booking> {
        let lock = self.token_locks.for_token(&request.token);
        let _serialized = lock.lock().await;

        if let Some(record) = self.idempotency.get(&request.token).await?
            && record.outcome == IdempotencyOutcome::Confirmed
            && let Some(existing) = self.ledger.get(record.booking_id).await?
        {
            return Ok(existing);
        }

        let train = self
            .catalog
            .get_train(&request.train_id)
            .await?
            .ok_or_else(|| {
                BookingError::Validation(format!("unknown train {}", request.train_id))
            })?;
        validation::validate(&request, &train)?;

        let booking = Booking::pending(&request);
        self.ledger.create(booking.clone()).await?;

        let charge = tokio::time::timeout(
            self.config.payment_timeout,
            self.gateway
                .charge(booking.total_amount, booking.payment, booking.id),
        )
        .await;

        match charge {
            Ok(Ok(ChargeOutcome::Approved { .. })) => {
                let confirmed = self
                    .ledger
                    .update_status(booking.id, BookingStatus::Pending, BookingStatus::Confirmed)
                    .await?;
                self.record_outcome(&request.token, booking.id, IdempotencyOutcome::Confirmed)
                    .await?;
                Ok(confirmed)
            }
            Ok(Ok(ChargeOutcome::Declined { reason })) => {
                self.resolve_failed(&request.token, booking.id).await?;
                Err(BookingError::PaymentDeclined { reason })
            }
            Ok(Err(err)) => {
                self.resolve_failed(&request.token, booking.id).await?;
                Err(err)
            }
            Err(_elapsed) => {
                self.resolve_failed(&request.token, booking.id).await?;
                Err(BookingError::PaymentGateway(format!(
                    "payment timed out after {:?}",
                    self.config.payment_timeout
                )))
            }
        }
    }

    async fn resolve_failed(&self, token: &str, booking_id: Uuid) -> Result<()> {
        self.ledger
            .update_status(booking_id, BookingStatus::Pending, BookingStatus::Failed)
            .await?;
        self.record_outcome(token, booking_id, IdempotencyOutcome::Failed)
            .await
    }

    async fn record_outcome(
        &self,
        token: &str,
        booking_id: Uuid,
        outcome: IdempotencyOutcome,
    ) -> Result<()> {
        self.idempotency
            .put(IdempotencyRecord {
                token: token.to_string(),
                booking_id,
                outcome,
            })
            .await
    }

    /// Cancels a confirmed booking owned by `user_id`.
    ///
    /// Cancelling an already-cancelled booking is a no-op returning the stored
    /// record, with no second refund event. Pending and failed bookings cannot
    /// be cancelled. A booking belonging to another user reads as not found.
    pub async fn cancel(&self, booking_id: Uuid, user_id: &str) -> Result<Booking> {
        let booking = self
            .ledger
            .get(booking_id)
            .await?
            .ok_or(BookingError::NotFound(booking_id))?;
        if booking.user_id != user_id {
            return Err(BookingError::NotFound(booking_id));
        }

        match booking.status {
            BookingStatus::Cancelled => Ok(booking),
            BookingStatus::Confirmed => {
                let cancelled = match self
                    .ledger
                    .update_status(
                        booking_id,
                        BookingStatus::Confirmed,
                        BookingStatus::Cancelled,
                    )
                    .await
                {
                    Ok(cancelled) => cancelled,
                    // Lost the race to another cancel. The winner already
                    // emitted the refund event; return the stored record.
                    Err(BookingError::Conflict {
                        actual: BookingStatus::Cancelled,
                        ..
                    }) => {
                        return self
                            .ledger
                            .get(booking_id)
                            .await?
                            .ok_or(BookingError::NotFound(booking_id));
                    }
                    Err(err) => return Err(err),
                };
                self.refunds
                    .refund_requested(RefundRequested {
                        booking_id,
                        user_id: cancelled.user_id.clone(),
                        amount: cancelled.total_amount,
                        requested_at: cancelled.cancelled_at.unwrap_or_else(Utc::now),
                    })
                    .await?;
                Ok(cancelled)
            }
            from => Err(BookingError::InvalidTransition {
                from,
                to: BookingStatus::Cancelled,
            }),
        }
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        self.ledger.list_by_user(user_id).await
    }

    pub async fn search_trains(
        &self,
        source: &str,
        destination: &str,
        day: Weekday,
    ) -> Result<Vec<Train>> {
        self.catalog.search_trains(source, destination, day).await
    }

    pub async fn stations(&self) -> Result<Vec<Station>> {
        self.catalog.list_stations().await
    }
}
