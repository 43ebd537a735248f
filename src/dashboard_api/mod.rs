//! Cisco Business Dashboard API integration module
//!
//! ## Request Flow
//!
//! 1. The embedding application builds `DashboardSettings` (or loads a
//!    `DashboardConfig` from the environment)
//! 2. The client signs an HS256 access token from the key id and secret
//! 3. Each fetcher issues one GET against `/api/v2/...` with the token as a
//!    bearer credential, plus `x-ctx-org-id` for node-scoped requests
//! 4. The `data` items of the response are mapped into typed records;
//!    items that do not fit are logged and skipped

pub mod client;
pub mod config;
pub mod extract;
pub mod jwt;
pub mod resources;
pub mod settings;
pub mod types;

pub use client::DashboardClient;
pub use config::DashboardConfig;
pub use jwt::{decode_token, generate_token, TokenClaims};
pub use resources::*;
pub use settings::DashboardSettings;
pub use types::{ApiError, DashboardError};
