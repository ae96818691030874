use async_trait::async_trait;
use railbook::application::engine::{BookingEngine, EngineConfig};
use railbook::domain::booking::{BookingRequest, Gender, Passenger, PaymentMethod};
use railbook::domain::catalog::{Station, Train, Weekday};
use railbook::domain::ports::{ChargeOutcome, PaymentGateway};
use railbook::error::Result;
use railbook::infrastructure::in_memory::{
    InMemoryCatalog, InMemoryIdempotencyStore, InMemoryLedger, InMemoryRefundLog,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

pub fn stations() -> Vec<Station> {
    vec![
        Station {
            id: "NDLS".to_string(),
            name: "New Delhi".to_string(),
        },
        Station {
            id: "BCT".to_string(),
            name: "Mumbai Central".to_string(),
        },
    ]
}

pub fn trains() -> Vec<Train> {
    vec![Train {
        id: "T1".to_string(),
        source: "NDLS".to_string(),
        destination: "BCT".to_string(),
        departure: chrono::NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        arrival: chrono::NaiveTime::from_hms_opt(16, 45, 0).unwrap(),
        running_days: BTreeSet::from([Weekday::Mon, Weekday::Wed, Weekday::Fri]),
        fares: BTreeMap::from([
            ("AC1".to_string(), dec!(500)),
            ("SL".to_string(), dec!(120)),
        ]),
    }]
}

pub fn request(token: &str) -> BookingRequest {
    BookingRequest {
        train_id: "T1".to_string(),
        class: "AC1".to_string(),
        quoted_fare: dec!(500),
        passengers: vec![Passenger {
            name: "Alice".to_string(),
            age: 30,
            gender: Gender::Female,
        }],
        user_id: "user-1".to_string(),
        payment: PaymentMethod::CreditCard,
        token: token.to_string(),
    }
}

/// Approves every charge after an optional delay, counting invocations.
pub struct CountingGateway {
    pub calls: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl CountingGateway {
    pub fn new(delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                delay,
            },
            calls,
        )
    }
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn charge(
        &self,
        _amount: Decimal,
        _method: PaymentMethod,
        booking_id: Uuid,
    ) -> Result<ChargeOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(ChargeOutcome::Approved {
            reference: format!("PAY-{booking_id}"),
        })
    }
}

pub fn engine(gateway: Box<dyn PaymentGateway>) -> (BookingEngine, InMemoryRefundLog) {
    let refunds = InMemoryRefundLog::new();
    let engine = BookingEngine::new(
        Box::new(InMemoryCatalog::new(stations(), trains())),
        Box::new(InMemoryLedger::new()),
        Box::new(InMemoryIdempotencyStore::new()),
        gateway,
        Box::new(refunds.clone()),
        EngineConfig::default(),
    );
    (engine, refunds)
}
