use crate::dashboard_api::config::DashboardConfig;
use crate::dashboard_api::resources::{Node, NodeInterface, NodeQuery, Organisation};
use crate::dashboard_api::settings::DashboardSettings;
use crate::dashboard_api::types::{ApiError, DashboardError};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, RwLock};

/// Header carrying the organisation context of node-scoped requests
pub const ORG_CONTEXT_HEADER: &str = "x-ctx-org-id";

/// HTTP client for the Cisco Business Dashboard v2 REST API
///
/// One client wraps one connection-pooled `reqwest::Client` and one set of
/// [`DashboardSettings`]. Clones share both, so fetchers may be awaited
/// concurrently from several tasks. The access token is regenerated on the
/// first request after the settings change.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    /// Overrides the `https://{host}:{port}/api/v2` base derived from settings
    base_url: Option<String>,
    /// HTTP client for making requests
    client: reqwest::Client,
    settings: Arc<RwLock<DashboardSettings>>,
}

impl DashboardClient {
    /// Create a client for the dashboard described by `settings`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ciscobd_sdk::{DashboardClient, DashboardSettings};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let settings = DashboardSettings::new("cbd.example.com", 443, "key-id", "secret");
    /// let client = DashboardClient::new(settings);
    ///
    /// for org in client.get_default_organisation().await? {
    ///     println!("{} ({:?} devices)", org.name, org.device_count);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(settings: DashboardSettings) -> Self {
        Self::with_http_client(settings, reqwest::Client::new())
    }

    /// Create a client that reuses an existing `reqwest::Client`
    pub fn with_http_client(settings: DashboardSettings, client: reqwest::Client) -> Self {
        tracing::debug!(
            "Creating DashboardClient for {}:{}",
            settings.host(),
            settings.port()
        );

        Self {
            base_url: None,
            client,
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// Create a client from loaded configuration
    ///
    /// Certificate verification is disabled when `config.verify_cert` is false,
    /// which self-signed dashboards require.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, DashboardError> {
        if !config.verify_cert {
            tracing::warn!(
                "TLS certificate verification disabled for dashboard {}",
                config.host
            );
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_cert)
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_http_client(config.to_settings(), client))
    }

    /// Send requests to `base_url` instead of the address in the settings
    ///
    /// `base_url` must include the `/api/v2` prefix.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    /// Get the base URL requests are sent to
    pub fn base_url(&self) -> Result<String, DashboardError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => self.with_settings(|s| s.base_url()),
        }
    }

    /// Read the settings
    pub fn with_settings<R>(
        &self,
        f: impl FnOnce(&DashboardSettings) -> R,
    ) -> Result<R, DashboardError> {
        let settings = self.settings.read().map_err(poisoned)?;
        Ok(f(&settings))
    }

    /// Change the settings; the token is regenerated before the next request
    ///
    /// ```no_run
    /// # use ciscobd_sdk::{DashboardClient, DashboardSettings};
    /// # let client = DashboardClient::new(DashboardSettings::new("h", 443, "k", "s"));
    /// client.update_settings(|s| s.set_secret("rotated-secret")).unwrap();
    /// ```
    pub fn update_settings<R>(
        &self,
        f: impl FnOnce(&mut DashboardSettings) -> R,
    ) -> Result<R, DashboardError> {
        let mut settings = self.settings.write().map_err(poisoned)?;
        Ok(f(&mut settings))
    }

    /// Token for the next request, signing a new one if the settings changed
    pub fn bearer_token(&self) -> Result<String, DashboardError> {
        {
            let settings = self.settings.read().map_err(poisoned)?;
            if !settings.is_stale() {
                if let Some(token) = settings.token() {
                    return Ok(token.to_string());
                }
            }
        }

        let mut settings = self.settings.write().map_err(poisoned)?;
        Ok(settings.current_token()?.to_string())
    }

    /// List every organisation visible to the access key
    pub async fn list_organisations(&self) -> Result<Vec<Organisation>, DashboardError> {
        let items = self.get_data("/orgs", None, &[]).await?;
        let organisations = map_records(items.iter(), Organisation::from_json);

        tracing::info!("Found {} organisations", organisations.len());
        Ok(organisations)
    }

    /// Get the organisations named `org_name`
    ///
    /// Returns an empty list when no organisation has that name.
    pub async fn get_organisation(
        &self,
        org_name: &str,
    ) -> Result<Vec<Organisation>, DashboardError> {
        let items = self.get_data("/orgs", None, &[]).await?;
        let matching = items
            .iter()
            .filter(|item| item.get("name").and_then(Value::as_str) == Some(org_name));

        let organisations = map_records(matching, Organisation::from_json);
        tracing::debug!(
            "Found {} organisations named '{}'",
            organisations.len(),
            org_name
        );
        Ok(organisations)
    }

    /// Get the default organisation
    ///
    /// Any item carrying a `default` key counts, whatever its value.
    pub async fn get_default_organisation(&self) -> Result<Vec<Organisation>, DashboardError> {
        let items = self.get_data("/orgs", None, &[]).await?;
        let defaults = items.iter().filter(|item| item.get("default").is_some());

        let organisations = map_records(defaults, Organisation::from_json);
        tracing::debug!("Found {} default organisations", organisations.len());
        Ok(organisations)
    }

    /// Resolve an organisation name to its id
    pub async fn get_organisation_id(
        &self,
        org_name: &str,
    ) -> Result<Option<String>, DashboardError> {
        let items = self.get_data("/orgs", None, &[]).await?;

        let org_id = items
            .iter()
            .find(|item| item.get("name").and_then(Value::as_str) == Some(org_name))
            .and_then(|item| item.get("id"))
            .map(value_to_string);

        tracing::debug!("Resolved organisation '{}' to {:?}", org_name, org_id);
        Ok(org_id)
    }

    /// List the device nodes of the organisation named `org_name`
    ///
    /// Requests hostname, type, IP address and serial number only. An
    /// unknown organisation yields an empty list.
    pub async fn list_nodes_for_organisation(
        &self,
        org_name: &str,
    ) -> Result<Vec<Node>, DashboardError> {
        self.list_nodes_with_query(org_name, &NodeQuery::default())
            .await
    }

    /// List the nodes of the organisation named `org_name` matching `query`
    pub async fn list_nodes_with_query(
        &self,
        org_name: &str,
        query: &NodeQuery,
    ) -> Result<Vec<Node>, DashboardError> {
        match self.get_organisation_id(org_name).await? {
            Some(org_id) => self.list_nodes_by_org_id(&org_id, query).await,
            None => {
                tracing::warn!("Organisation '{}' not found, no nodes listed", org_name);
                Ok(Vec::new())
            }
        }
    }

    /// List the nodes of organisation `org_id` matching `query`
    pub async fn list_nodes_by_org_id(
        &self,
        org_id: &str,
        query: &NodeQuery,
    ) -> Result<Vec<Node>, DashboardError> {
        let items = self
            .get_data("/nodes", Some(org_id), &query.to_query_pairs())
            .await?;
        let nodes = map_records(items.iter(), Node::from_json);

        tracing::info!("Found {} nodes in organisation {}", nodes.len(), org_id);
        Ok(nodes)
    }

    /// List the interfaces of node `node_id` in the organisation named `org_name`
    pub async fn get_node_interfaces(
        &self,
        org_name: &str,
        node_id: &str,
    ) -> Result<Vec<NodeInterface>, DashboardError> {
        match self.get_organisation_id(org_name).await? {
            Some(org_id) => self.get_node_interfaces_by_org_id(&org_id, node_id).await,
            None => {
                tracing::warn!(
                    "Organisation '{}' not found, no interfaces listed",
                    org_name
                );
                Ok(Vec::new())
            }
        }
    }

    /// List the interfaces of node `node_id` in organisation `org_id`
    ///
    /// A node that is not returned, or that reports no `interfaces`, yields
    /// an empty list.
    pub async fn get_node_interfaces_by_org_id(
        &self,
        org_id: &str,
        node_id: &str,
    ) -> Result<Vec<NodeInterface>, DashboardError> {
        let path = format!("/nodes/{}", node_id);
        let items = self.get_data(&path, Some(org_id), &[]).await?;

        let Some(node) = items.first() else {
            tracing::debug!("Node {} not returned by the dashboard", node_id);
            return Ok(Vec::new());
        };

        let Some(interfaces) = node.get("interfaces").and_then(Value::as_array) else {
            tracing::warn!("Got wrong data: node {} has no interfaces array", node_id);
            return Ok(Vec::new());
        };

        let interfaces = map_records(interfaces.iter(), NodeInterface::from_json);
        tracing::debug!("Found {} interfaces on node {}", interfaces.len(), node_id);
        Ok(interfaces)
    }

    /// GET `path` and return the items of the response's `data` member
    async fn get_data(
        &self,
        path: &str,
        org_id: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<Vec<Value>, DashboardError> {
        let url = format!("{}{}", self.base_url()?, path);
        let token = self.bearer_token()?;

        tracing::debug!("Sending GET request to: {}", url);

        let mut request = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token));
        if let Some(org_id) = org_id {
            request = request.header(ORG_CONTEXT_HEADER, org_id);
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", url, e);
            ApiError::from(e)
        })?;

        let status = response.status();
        tracing::debug!("Received response with status: {}", status);

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body from {}: {}", url, e);
            ApiError::from(e)
        })?;

        parse_data(status, &body).inspect_err(|e| {
            tracing::error!("Request to {} failed: {}", url, e);
        })
    }
}

/// Interpret a response body, whatever its declared content type
///
/// An `error` object wins over everything else, including a 2xx status.
fn parse_data(status: StatusCode, body: &str) -> Result<Vec<Value>, DashboardError> {
    let payload: Value = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) if status.is_success() => {
            return Err(ApiError::Parse(format!("Failed to parse response JSON: {}", e)).into());
        }
        Err(_) => {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: body.to_string(),
            }
            .into());
        }
    };

    if let Some(error) = payload.get("error") {
        let code = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or_else(|| status.as_u16());
        let message = match error.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => error.to_string(),
        };
        return Err(ApiError::Http {
            status: code,
            message,
        }
        .into());
    }

    if !status.is_success() {
        return Err(ApiError::Http {
            status: status.as_u16(),
            message: body.to_string(),
        }
        .into());
    }

    match payload {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => {
                Err(ApiError::Parse("Response has no data member".to_string()).into())
            }
            Some(item) => Ok(vec![item]),
        },
        _ => Err(ApiError::Parse("Response is not a JSON object".to_string()).into()),
    }
}

/// Map every item, skipping and logging the ones that do not fit
fn map_records<'a, T, F>(items: impl Iterator<Item = &'a Value>, mapper: F) -> Vec<T>
where
    F: Fn(&Value) -> Result<T, serde_json::Error>,
{
    items
        .filter_map(|item| match mapper(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Got wrong data: {} ({})", item, e);
                None
            }
        })
        .collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> DashboardError {
    DashboardError::Config(format!("Settings lock poisoned: {}", err))
}
