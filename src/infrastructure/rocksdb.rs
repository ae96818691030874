use crate::domain::booking::{Booking, BookingStatus, IdempotencyRecord};
use crate::domain::ports::{BookingLedger, IdempotencyStore};
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column family for booking records.
pub const CF_BOOKINGS: &str = "bookings";
/// Column family for idempotency records, keyed by token.
pub const CF_IDEMPOTENCY: &str = "idempotency";

/// Persistent booking ledger and idempotency store backed by RocksDB.
///
/// Values are JSON documents. `Clone` shares the underlying `Arc<DB>`. The
/// compare-and-swap in `update_status` is a read-modify-write, serialized by
/// an internal mutex so concurrent transitions cannot interleave.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    cas_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the given path, ensuring both
    /// column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_bookings = ColumnFamilyDescriptor::new(CF_BOOKINGS, Options::default());
        let cf_idempotency = ColumnFamilyDescriptor::new(CF_IDEMPOTENCY, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_bookings, cf_idempotency])?;

        Ok(Self {
            db: Arc::new(db),
            cas_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BookingError::Storage(format!("column family {name} not found")))
    }

    fn read_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        let cf = self.cf(CF_BOOKINGS)?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_booking(&self, booking: &Booking) -> Result<()> {
        let cf = self.cf(CF_BOOKINGS)?;
        let value = serde_json::to_vec(booking)?;
        self.db.put_cf(cf, booking.id.as_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl BookingLedger for RocksDBStore {
    async fn create(&self, booking: Booking) -> Result<()> {
        self.write_booking(&booking)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>> {
        self.read_booking(id)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let cf = self.cf(CF_BOOKINGS)?;
        let mut mine = Vec::new();

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let booking: Booking = serde_json::from_slice(&value)?;
            if booking.user_id == user_id {
                mine.push(booking);
            }
        }

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

        let _cas = self.cas_lock.lock().await;
        let mut booking = self.read_booking(id)?.ok_or(BookingError::NotFound(id))?;
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
        self.write_booking(&booking)?;
        Ok(booking)
    }
}

#[async_trait]
impl IdempotencyStore for RocksDBStore {
    async fn get(&self, token: &str) -> Result<Option<IdempotencyRecord>> {
        let cf = self.cf(CF_IDEMPOTENCY)?;
        match self.db.get_cf(cf, token.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, record: IdempotencyRecord) -> Result<()> {
        let cf = self.cf(CF_IDEMPOTENCY)?;
        let value = serde_json::to_vec(&record)?;
        self.db.put_cf(cf, record.token.as_bytes(), value)?;
        Ok(())
    }
}
