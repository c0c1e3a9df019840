//! Application layer: the two halves of a donation.
//!
//! `ChargeService` is the server half. It validates a charge request and then
//! exchanges the token for a confirmed PaymentIntent. `DonationForm` is the
//! client half: it holds the form input and the payment-status state machine.

pub mod charge;
pub mod form;
