use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Other,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Upi,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Passenger {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
}

/// What a client submits. Transient; never persisted as-is.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BookingRequest {
    pub train_id: String,
    pub class: String,
    /// Fare per passenger as quoted to the client. Re-checked against the
    /// catalog before any payment attempt.
    pub quoted_fare: Decimal,
    pub passengers: Vec<Passenger>,
    pub user_id: String,
    pub payment: PaymentMethod,
    /// Client-supplied idempotency token.
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Failed,
}

impl BookingStatus {
    /// Legal transitions: pending->confirmed, pending->failed,
    /// confirmed->cancelled. Cancelled and failed are terminal.
    pub fn can_transition(self, to: BookingStatus) -> bool {
        matches!(
            (self, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Failed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Failed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A persisted booking record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: String,
    pub train_id: String,
    pub class: String,
    /// Fare per passenger at the moment of creation.
    pub fare: Decimal,
    pub passengers: Vec<Passenger>,
    /// fare x passenger count, fixed at creation and never recomputed.
    pub total_amount: Decimal,
    pub payment: PaymentMethod,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub token: String,
}

impl Booking {
    /// Creates a pending booking from a validated request. The total is
    /// computed here, once.
    pub fn pending(request: &BookingRequest) -> Self {
        let total_amount =
            request.quoted_fare * Decimal::from(request.passengers.len() as u64);
        Self {
            id: Uuid::new_v4(),
            user_id: request.user_id.clone(),
            train_id: request.train_id.clone(),
            class: request.class.clone(),
            fare: request.quoted_fare,
            passengers: request.passengers.clone(),
            total_amount,
            payment: request.payment,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
            cancelled_at: None,
            token: request.token.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum IdempotencyOutcome {
    Confirmed,
    Failed,
}

/// Maps a client token to the booking it produced and how that attempt ended.
/// Owned and exclusively mutated by the booking engine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct IdempotencyRecord {
    pub token: String,
    pub booking_id: Uuid,
    pub outcome: IdempotencyOutcome,
}
