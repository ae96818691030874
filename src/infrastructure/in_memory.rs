use crate::domain::booking::{Booking, BookingStatus, IdempotencyRecord};
use crate::domain::catalog::{Station, Train, Weekday};
use crate::domain::ports::{
    BookingLedger, CatalogStore, IdempotencyStore, RefundNotifier, RefundRequested,
};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory catalog seeded once at startup. Read-only thereafter.
#[derive(Clone)]
pub struct InMemoryCatalog {
    stations: Arc<Vec<Station>>,
    trains: Arc<HashMap<String, Train>>,
}

impl InMemoryCatalog {
    pub fn new(stations: Vec<Station>, trains: Vec<Train>) -> Self {
        let trains = trains.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            stations: Arc::new(stations),
            trains: Arc::new(trains),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_train(&self, train_id: &str) -> Result<Option<Train>> {
        Ok(self.trains.get(train_id).cloned())
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        Ok(self.stations.as_ref().clone())
    }

    async fn search_trains(
        &self,
        source: &str,
        destination: &str,
        day: Weekday,
    ) -> Result<Vec<Train>> {
        let mut matches: Vec<Train> = self
            .trains
            .values()
            .filter(|t| t.source == source && t.destination == destination && t.runs_on(day))
            .cloned()
            .collect();
        matches.sort_by_key(|t| t.departure);
        Ok(matches)
    }
}

/// A thread-safe in-memory booking ledger.
///
/// `update_status` performs the compare-and-swap inside a single write-lock
/// critical section, so a concurrent cancellation and payment resolution for
/// the same booking cannot both win.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingLedger for InMemoryLedger {
    async fn create(&self, booking: Booking) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut mine: Vec<Booking> = bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking> {
        if !from.can_transition(to) {
            return Err(BookingError::InvalidTransition { from, to });
        }

        let mut bookings = self.bookings.write().await;
        let booking = bookings.get_mut(&id).ok_or(BookingError::NotFound(id))?;
        if booking.status != from {
            return Err(BookingError::Conflict {
                id,
                expected: from,
                actual: booking.status,
            });
        }

        booking.status = to;
        if to == BookingStatus::Cancelled {
            booking.cancelled_at = Some(Utc::now());
        }
        Ok(booking.clone())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryIdempotencyStore {
    records: Arc<RwLock<HashMap<String, IdempotencyRecord>>>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn get(&self, token: &str) -> Result<Option<IdempotencyRecord>> {
        let records = self.records.read().await;
        Ok(records.get(token).cloned())
    }

    async fn put(&self, record: IdempotencyRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.token.clone(), record);
        Ok(())
    }
}

/// Collects refund events in memory. The binary uses it as its notifier;
/// tests use it to assert exactly one event per cancellation.
#[derive(Default, Clone)]
pub struct InMemoryRefundLog {
    events: Arc<RwLock<Vec<RefundRequested>>>,
}

impl InMemoryRefundLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<RefundRequested> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl RefundNotifier for InMemoryRefundLog {
    async fn refund_requested(&self, event: RefundRequested) -> Result<()> {
        let mut events = self.events.write().await;
        events.push(event);
        Ok(())
    }
}
