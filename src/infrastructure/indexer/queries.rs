//! GraphQL documents for the Envio indexer (Hasura-style root fields).

pub const USER_ACTIVITIES: &str = r"query UserActivities($user: String!, $limit: Int!) {
  UserActivity(where: {user: {_eq: $user}}, order_by: {timestamp: desc}, limit: $limit) {
    id
    user
    activityType
    protocol
    token
    amount
    txHash
    timestamp
  }
}";
pub const USER_ACTIVITIES_FIELD: &str = "UserActivity";

pub const PERMISSIONS: &str = r"query Permissions($user: String!) {
  Permission(where: {user: {_eq: $user}}) {
    id
    user
    delegate
    token
    allowance
    period
    expiresAt
    active
  }
}";
pub const PERMISSIONS_FIELD: &str = "Permission";

pub const PORTFOLIO_SNAPSHOTS: &str = r"query PortfolioSnapshots($user: String!, $limit: Int!) {
  PortfolioSnapshot(where: {user: {_eq: $user}}, order_by: {timestamp: desc}, limit: $limit) {
    id
    user
    totalValueUsd
    timestamp
  }
}";
pub const PORTFOLIO_SNAPSHOTS_FIELD: &str = "PortfolioSnapshot";

pub const YIELD_POOLS: &str = r"query YieldPools($limit: Int!) {
  YieldPool(order_by: {apy: desc}, limit: $limit) {
    id
    protocol
    asset
    apy
    tvl
  }
}";
pub const YIELD_POOLS_FIELD: &str = "YieldPool";
