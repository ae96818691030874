use crate::domain::booking::BookingRequest;
use crate::domain::catalog::Train;
use crate::error::{BookingError, Result};

const MAX_PASSENGER_AGE: u8 = 120;

/// Checks a request against the current catalog state of its train. Returns
/// the first violated constraint; read-only, no side effects.
///
/// The quoted fare must equal the fare currently stored for the class, which
/// rejects submissions made against a stale price.
pub fn validate(request: &BookingRequest, train: &Train) -> Result<()> {
    let Some(current_fare) = train.fare_for(&request.class) else {
        return Err(BookingError::Validation(format!(
            "class {} is not available on train {}",
            request.class, train.id
        )));
    };

    if request.quoted_fare != current_fare {
        return Err(BookingError::Validation(format!(
            "fare for class {} on train {} has changed: quoted {}, current {}",
            request.class, train.id, request.quoted_fare, current_fare
        )));
    }

    if request.passengers.is_empty() {
        return Err(BookingError::Validation(
            "passenger list is empty".to_string(),
        ));
    }

    for passenger in &request.passengers {
        if passenger.name.trim().is_empty() {
            return Err(BookingError::Validation(
                "passenger name must not be empty".to_string(),
            ));
        }
        if passenger.age == 0 || passenger.age > MAX_PASSENGER_AGE {
            return Err(BookingError::Validation(format!(
                "passenger {} has invalid age {}",
                passenger.name, passenger.age
            )));
        }
    }

    Ok(())
}
