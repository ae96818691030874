mod common;

use common::{CountingGateway, engine, request};
use railbook::domain::booking::BookingStatus;
use railbook::error::BookingError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn test_confirmed_booking_totals() {
    let (gateway, calls) = CountingGateway::new(Duration::ZERO);
    let (engine, _) = engine(Box::new(gateway));

    let mut req = request("tok-1");
    req.passengers.push(railbook::domain::booking::Passenger {
        name: "Bob".to_string(),
        age: 35,
        gender: railbook::domain::booking::Gender::Male,
    });

    let booking = engine.submit(req).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.fare, dec!(500));
    assert_eq!(
        booking.total_amount,
        booking.fare * Decimal::from(booking.passengers.len() as u64)
    );
    assert_eq!(booking.total_amount, dec!(1000));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_fare_rejected_before_any_charge() {
    let (gateway, calls) = CountingGateway::new(Duration::ZERO);
    let (engine, _) = engine(Box::new(gateway));

    let mut req = request("tok-1");
    req.quoted_fare = dec!(600);

    let err = engine.submit(req).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    // Nothing persisted either.
    assert!(engine.list_by_user("user-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_passenger_list_rejected() {
    let (gateway, calls) = CountingGateway::new(Duration::ZERO);
    let (engine, _) = engine(Box::new(gateway));

    let mut req = request("tok-1");
    req.passengers.clear();

    let err = engine.submit(req).await.unwrap_err();
    assert!(err.to_string().contains("passenger list is empty"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sequential_resubmit_returns_same_booking() {
    let (gateway, calls) = CountingGateway::new(Duration::ZERO);
    let (engine, _) = engine(Box::new(gateway));

    let first = engine.submit(request("tok-1")).await.unwrap();
    let second = engine.submit(request("tok-1")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_distinct_tokens_create_distinct_bookings() {
    let (gateway, calls) = CountingGateway::new(Duration::ZERO);
    let (engine, _) = engine(Box::new(gateway));

    let first = engine.submit(request("tok-1")).await.unwrap();
    let second = engine.submit(request("tok-2")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.list_by_user("user-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_and_station_listing() {
    use railbook::domain::catalog::Weekday;

    let (gateway, _) = CountingGateway::new(Duration::ZERO);
    let (engine, _) = engine(Box::new(gateway));

    let found = engine
        .search_trains("NDLS", "BCT", Weekday::Wed)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "T1");

    let none = engine
        .search_trains("NDLS", "BCT", Weekday::Sun)
        .await
        .unwrap();
    assert!(none.is_empty());

    let stations = engine.stations().await.unwrap();
    assert_eq!(stations.len(), 2);
}
