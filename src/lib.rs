//! Cisco Business Dashboard SDK
//!
//! An asynchronous client for the Cisco Business Dashboard v2 REST API.
//!
//! This SDK provides:
//! - HS256 access token generation with key id lookup headers
//! - Session settings that re-sign the token whenever credentials change
//! - Organisation and node queries mapped into typed records
//! - Environment-driven configuration and error types
//!
//! # Example
//!
//! ```no_run
//! use ciscobd_sdk::{DashboardClient, DashboardConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // CBD_DASHBOARD, CBD_KEY_ID and CBD_SECRET must be set
//! let config = DashboardConfig::from_env()?;
//! let client = DashboardClient::from_config(&config)?;
//!
//! let orgs = client.get_default_organisation().await?;
//! println!("{} organisations found", orgs.len());
//!
//! for node in client.list_nodes_for_organisation("Default").await? {
//!     println!("{:?} {:?} {:?}", node.hostname, node.device_type, node.ip_address);
//! }
//! # Ok(())
//! # }
//! ```

pub mod dashboard_api;

// Re-export commonly used types and functions
pub use dashboard_api::{
    client::{DashboardClient, ORG_CONTEXT_HEADER},
    config::DashboardConfig,
    extract::{find_at, find_first},
    jwt::{decode_token, generate_token, TokenClaims, DASHBOARD_AUDIENCE},
    resources::{Node, NodeCounters, NodeInterface, NodeQuery, Organisation, PoeStatus},
    settings::DashboardSettings,
    types::{ApiError, DashboardError},
};
