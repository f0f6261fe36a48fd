//! Envio GraphQL indexer client.

pub mod client;
pub mod errors;
pub mod queries;

pub use client::EnvioIndexerClient;
pub use errors::IndexerError;
