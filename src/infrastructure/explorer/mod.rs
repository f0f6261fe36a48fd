//! Block explorer client (Etherscan-compatible).

pub mod client;
pub mod errors;
pub mod rate_limiter;

pub use client::EtherscanClient;
pub use errors::ExplorerError;
pub use rate_limiter::TokenBucketRateLimiter;
