use crate::domain::booking::PaymentMethod;
use crate::domain::ports::{ChargeOutcome, PaymentGateway};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use uuid::Uuid;

/// Stand-in for the real payment gateway: waits for a configurable processing
/// delay, then approves with a generated reference, or declines everything
/// when built with `declining`.
pub struct SimulatedGateway {
    delay: Duration,
    decline: bool,
}

impl SimulatedGateway {
    pub fn approving(delay: Duration) -> Self {
        Self {
            delay,
            decline: false,
        }
    }

    pub fn declining(delay: Duration) -> Self {
        Self {
            delay,
            decline: true,
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(
        &self,
        _amount: Decimal,
        _method: PaymentMethod,
        _booking_id: Uuid,
    ) -> Result<ChargeOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.decline {
            Ok(ChargeOutcome::Declined {
                reason: "declined by issuer".to_string(),
            })
        } else {
            Ok(ChargeOutcome::Approved {
                reference: format!("PAY-{}", Uuid::new_v4().simple()),
            })
        }
    }
}
