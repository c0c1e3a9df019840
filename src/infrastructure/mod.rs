//! Adapters behind the domain ports: HTTP clients for the vault, the
//! processor and the charge endpoint, plus in-process sandbox stand-ins.

pub mod basis_theory;
pub mod charge_api;
pub mod sandbox;
pub mod stripe;
