//! Domain layer for MetaArmy
//!
//! Core intent models, chain representations and the ports the
//! infrastructure layer implements.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
