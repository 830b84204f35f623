//! Hosted checkout sessions with the payment provider.
//!
//! Card data never passes through this crate: the shopper is redirected to the
//! provider's hosted page and only the session id and URL come back.

pub mod client;
pub mod error;
pub mod session;

pub use client::{CheckoutClient, CheckoutSession};
pub use error::PaymentError;
pub use session::{build_session_request, CheckoutSessionRequest, SessionLineItem, SessionSettings};
