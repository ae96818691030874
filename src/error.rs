use crate::domain::booking::BookingStatus;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, BookingError>;

#[derive(Error, Debug)]
pub enum BookingError {
    /// Client-correctable request problem (unknown train, stale fare, bad
    /// passenger data). Nothing is persisted when this is returned.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The gateway processed the charge and said no.
    #[error("payment declined: {reason}")]
    PaymentDeclined { reason: String },

    /// The gateway could not be reached or did not answer in time. Retryable.
    #[error("payment gateway error: {0}")]
    PaymentGateway(String),

    /// Compare-and-swap on a booking status lost a race. Callers should
    /// re-read the booking rather than retry the same transition.
    #[error("booking {id}: expected status {expected}, found {actual}")]
    Conflict {
        id: Uuid,
        expected: BookingStatus,
        actual: BookingStatus,
    },

    /// A transition the state machine does not allow. Never ignored.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("booking not found: {0}")]
    NotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::Storage(err.to_string())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BookingError {
    fn from(err: rocksdb::Error) -> Self {
        BookingError::Storage(err.to_string())
    }
}
