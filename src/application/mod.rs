//! Application layer orchestrating the booking transaction flow.
//!
//! `BookingEngine` is the single entry point: it validates requests against
//! the catalog, serializes submissions per idempotency token, drives the
//! payment gateway call, and resolves every booking to a terminal status.

pub mod engine;
pub mod validation;
