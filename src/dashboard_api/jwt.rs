use crate::dashboard_api::types::DashboardError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Audience every dashboard token is issued for
pub const DASHBOARD_AUDIENCE: &str = "business-dashboard.cisco.com";

/// Issuer used when the embedding application does not name itself
pub const DEFAULT_APP_NAME: &str = "cbdscript.example.com";

/// Application version used when none is supplied
pub const DEFAULT_APP_VERSION: &str = "1.0";

/// Default token lifetime in seconds
pub const DEFAULT_TOKEN_LIFETIME: u64 = 3600;

/// Claim set carried by a dashboard access token
///
/// The dashboard looks up the shared secret through the `kid` header and
/// then checks these claims. `cid` identifies the application instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer - the application name
    pub iss: String,
    /// Client id of this application instance
    pub cid: String,
    /// Application version
    pub appver: String,
    /// Audience - always [`DASHBOARD_AUDIENCE`]
    pub aud: String,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    /// Build a claim set issued now and valid for `lifetime_secs`
    pub fn new(
        app_name: impl Into<String>,
        client_id: impl Into<String>,
        app_version: impl Into<String>,
        lifetime_secs: u64,
    ) -> Self {
        let iat = chrono::Utc::now().timestamp();
        let lifetime = i64::try_from(lifetime_secs).unwrap_or(i64::MAX);

        Self {
            iss: app_name.into(),
            cid: client_id.into(),
            appver: app_version.into(),
            aud: DASHBOARD_AUDIENCE.to_string(),
            iat,
            exp: iat.saturating_add(lifetime),
        }
    }

    /// Seconds between issue and expiry
    pub fn lifetime(&self) -> i64 {
        self.exp - self.iat
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }
}

/// Sign a claim set with the shared secret, tagging the header with `key_id`
pub fn sign_claims(
    key_id: &str,
    secret: &str,
    claims: &TokenClaims,
) -> Result<String, DashboardError> {
    if key_id.is_empty() {
        return Err(DashboardError::Token("Key id must not be empty".to_string()));
    }
    if secret.is_empty() {
        return Err(DashboardError::Token("Secret must not be empty".to_string()));
    }

    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(key_id.to_string());

    let token = encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes()))?;
    tracing::debug!(
        "Generated dashboard token: kid={}, iss={}, exp={}",
        key_id,
        claims.iss,
        claims.exp
    );
    Ok(token)
}

/// Generate a signed access token for the dashboard API
///
/// # Arguments
///
/// * `key_id` - Access key id, placed in the `kid` header
/// * `secret` - Shared secret for HMAC-SHA256 signing
/// * `client_id` - Client id for the `cid` claim; a fresh UUID when `None`
/// * `app_name` - Issuer claim
/// * `app_version` - `appver` claim
/// * `lifetime_secs` - Seconds until `exp`
///
/// # Example
///
/// ```
/// use ciscobd_sdk::generate_token;
///
/// let token = generate_token(
///     "615ac54546dbad0607af8416",
///     "shared-secret",
///     None,
///     "cbd.example.com",
///     "1.0",
///     3600,
/// ).unwrap();
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn generate_token(
    key_id: &str,
    secret: &str,
    client_id: Option<&str>,
    app_name: &str,
    app_version: &str,
    lifetime_secs: u64,
) -> Result<String, DashboardError> {
    let client_id = client_id
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let claims = TokenClaims::new(app_name, client_id, app_version, lifetime_secs);
    sign_claims(key_id, secret, &claims)
}

/// Verify a dashboard token against the shared secret and return its
/// header and claims
///
/// Signature, audience and expiry are checked.
pub fn decode_token(token: &str, secret: &str) -> Result<(Header, TokenClaims), DashboardError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[DASHBOARD_AUDIENCE]);

    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<TokenClaims>(token, &key, &validation)
        .map_err(|e| DashboardError::Token(format!("Token verification failed: {}", e)))?;

    Ok((data.header, data.claims))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_carries_kid_and_claims() {
        let token = generate_token("key-1", "secret", Some("client-1"), "app", "2.0", 600).unwrap();
        let (header, claims) = decode_token(&token, "secret").unwrap();

        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));
        assert_eq!(claims.iss, "app");
        assert_eq!(claims.cid, "client-1");
        assert_eq!(claims.appver, "2.0");
        assert_eq!(claims.aud, DASHBOARD_AUDIENCE);
        assert_eq!(claims.exp, claims.iat + 600);
    }

    #[test]
    fn test_generate_token_without_client_id_uses_uuid() {
        let token = generate_token("key-1", "secret", None, "app", "1.0", 60).unwrap();
        let (_, claims) = decode_token(&token, "secret").unwrap();
        assert!(uuid::Uuid::parse_str(&claims.cid).is_ok());
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let result = generate_token("key-1", "", None, "app", "1.0", 60);
        assert!(matches!(result, Err(DashboardError::Token(_))));
    }

    #[test]
    fn test_empty_key_id_is_rejected() {
        let result = generate_token("", "secret", None, "app", "1.0", 60);
        assert!(matches!(result, Err(DashboardError::Token(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret_fails() {
        let token = generate_token("key-1", "secret", None, "app", "1.0", 60).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn test_claims_is_expired() {
        let mut claims = TokenClaims::new("app", "cid", "1.0", 3600);
        assert!(!claims.is_expired());
        assert_eq!(claims.lifetime(), 3600);

        claims.iat -= 7200;
        claims.exp -= 7200;
        assert!(claims.is_expired());
    }
}
