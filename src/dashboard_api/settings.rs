use crate::dashboard_api::jwt::{
    sign_claims, TokenClaims, DEFAULT_APP_NAME, DEFAULT_APP_VERSION, DEFAULT_TOKEN_LIFETIME,
};
use crate::dashboard_api::types::DashboardError;
use secrecy::{ExposeSecret, SecretString};

/// Connection and credential settings for one dashboard session
///
/// The settings own the current access token. Any write to a field that
/// feeds the token marks it stale, and the next call to
/// [`current_token`](Self::current_token) signs a new one. Regeneration is
/// never triggered from inside a setter.
///
/// # Example
///
/// ```
/// use ciscobd_sdk::DashboardSettings;
///
/// let mut settings = DashboardSettings::new("cbd.example.com", 443, "key-id", "secret")
///     .with_app_name("cbd.example.com");
///
/// let first = settings.current_token().unwrap().to_string();
/// settings.set_key_id("other-key");
/// assert!(settings.is_stale());
/// assert_ne!(settings.current_token().unwrap(), first);
/// ```
#[derive(Debug)]
pub struct DashboardSettings {
    host: String,
    port: u16,
    key_id: String,
    secret: SecretString,
    app_name: String,
    app_version: String,
    client_id: String,
    lifetime: u64,
    token: Option<String>,
    stale: bool,
}

impl DashboardSettings {
    /// Create settings for a dashboard reachable at `host:port`
    ///
    /// A client id is generated (UUID v4) and the application metadata
    /// takes its defaults. No token is signed until one is requested.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        key_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            key_id: key_id.into(),
            secret: SecretString::from(secret.into()),
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            client_id: uuid::Uuid::new_v4().to_string(),
            lifetime: DEFAULT_TOKEN_LIFETIME,
            token: None,
            stale: true,
        }
    }

    /// Set the application name (builder pattern)
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.set_app_name(app_name);
        self
    }

    /// Set the application version (builder pattern)
    pub fn with_app_version(mut self, app_version: impl Into<String>) -> Self {
        self.set_app_version(app_version);
        self
    }

    /// Set the client id (builder pattern)
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.set_client_id(client_id);
        self
    }

    /// Set the token lifetime in seconds (builder pattern)
    pub fn with_lifetime(mut self, lifetime_secs: u64) -> Self {
        self.set_lifetime(lifetime_secs);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Token lifetime in seconds
    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
        self.stale = true;
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
        self.stale = true;
    }

    pub fn set_key_id(&mut self, key_id: impl Into<String>) {
        self.key_id = key_id.into();
        self.stale = true;
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = SecretString::from(secret.into());
        self.stale = true;
    }

    pub fn set_app_name(&mut self, app_name: impl Into<String>) {
        self.app_name = app_name.into();
        self.stale = true;
    }

    pub fn set_app_version(&mut self, app_version: impl Into<String>) {
        self.app_version = app_version.into();
        self.stale = true;
    }

    pub fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.client_id = client_id.into();
        self.stale = true;
    }

    pub fn set_lifetime(&mut self, lifetime_secs: u64) {
        self.lifetime = lifetime_secs;
        self.stale = true;
    }

    /// Install a token obtained elsewhere
    ///
    /// The token is used as-is until another field changes.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
        self.stale = false;
    }

    /// The cached token, without regenerating it
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether the cached token no longer reflects the settings
    pub fn is_stale(&self) -> bool {
        self.stale || self.token.is_none()
    }

    /// Names of the fields that must be filled before a token can be signed
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.is_empty() {
            missing.push("host");
        }
        if self.port == 0 {
            missing.push("port");
        }
        if self.key_id.is_empty() {
            missing.push("key_id");
        }
        if self.secret.expose_secret().is_empty() {
            missing.push("secret");
        }
        missing
    }

    /// Host, port, key id and secret are all set
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Sign a new token from the current settings
    pub fn refresh(&mut self) -> Result<&str, DashboardError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(DashboardError::Config(format!(
                "Cannot generate token, missing: {}",
                missing.join(", ")
            )));
        }

        tracing::debug!("Generating new dashboard token for {}", self.host);
        let claims = TokenClaims::new(
            self.app_name.as_str(),
            self.client_id.as_str(),
            self.app_version.as_str(),
            self.lifetime,
        );
        let token = sign_claims(&self.key_id, self.secret.expose_secret(), &claims)?;

        self.stale = false;
        Ok(self.token.insert(token).as_str())
    }

    /// The token to send with the next request, regenerated if stale
    pub fn current_token(&mut self) -> Result<&str, DashboardError> {
        if self.is_stale() {
            self.refresh()?;
        }
        self.token
            .as_deref()
            .ok_or_else(|| DashboardError::Token("No token available".to_string()))
    }

    /// Base URL of the v2 REST API
    pub fn base_url(&self) -> String {
        format!("https://{}:{}/api/v2", self.host, self.port)
    }
}
