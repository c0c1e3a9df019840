//! Domain types shared by the form controller and the charge handler, and the
//! ports through which both reach the vault and the processor.

pub mod amount;
pub mod payment;
pub mod ports;
pub mod token;
