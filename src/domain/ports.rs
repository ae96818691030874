use super::booking::{Booking, BookingStatus, IdempotencyRecord, PaymentMethod};
use super::catalog::{Station, Train, Weekday};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of the station/train catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_train(&self, train_id: &str) -> Result<Option<Train>>;
    async fn list_stations(&self) -> Result<Vec<Station>>;
    async fn search_trains(
        &self,
        source: &str,
        destination: &str,
        day: Weekday,
    ) -> Result<Vec<Train>>;
}

/// Persisted booking records.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn create(&self, booking: Booking) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Booking>>;
    /// Bookings for one user, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>>;
    /// Compare-and-swap on status. Fails with `Conflict` if the stored status
    /// is not `from`, with `InvalidTransition` if the pair is illegal. Stamps
    /// `cancelled_at` when `to` is `Cancelled`. Returns the updated booking.
    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking>;
}

#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn get(&self, token: &str) -> Result<Option<IdempotencyRecord>>;
    /// Inserts or replaces the record for `record.token`.
    async fn put(&self, record: IdempotencyRecord) -> Result<()>;
}

#[derive(Debug, PartialEq, Clone)]
pub enum ChargeOutcome {
    Approved { reference: String },
    Declined { reason: String },
}

/// The external payment gateway. `Err` means the gateway itself misbehaved
/// (transport failure); a processed-but-refused charge is `Declined`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(
        &self,
        amount: Decimal,
        method: PaymentMethod,
        booking_id: Uuid,
    ) -> Result<ChargeOutcome>;
}

/// Emitted once when a confirmed booking is cancelled. Refund execution is an
/// external workflow; the core's responsibility ends at this event.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RefundRequested {
    pub booking_id: Uuid,
    pub user_id: String,
    pub amount: Decimal,
    pub requested_at: DateTime<Utc>,
}

#[async_trait]
pub trait RefundNotifier: Send + Sync {
    async fn refund_requested(&self, event: RefundRequested) -> Result<()>;
}

pub type CatalogStoreBox = Box<dyn CatalogStore>;
pub type BookingLedgerBox = Box<dyn BookingLedger>;
pub type IdempotencyStoreBox = Box<dyn IdempotencyStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type RefundNotifierBox = Box<dyn RefundNotifier>;
