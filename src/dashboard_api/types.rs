use std::fmt;

/// Cisco Business Dashboard client error type
///
/// Represents all possible errors that can occur when talking to the
/// dashboard or preparing a request for it.
#[derive(Debug)]
pub enum DashboardError {
    /// Token could not be generated or verified
    Token(String),
    /// API request failed (network, HTTP, server-reported or parsing error)
    Api(ApiError),
    /// Configuration error
    Config(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Token(msg) => write!(f, "Token error: {}", msg),
            DashboardError::Api(err) => write!(f, "API error: {}", err),
            DashboardError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for DashboardError {
    fn from(err: ApiError) -> Self {
        DashboardError::Api(err)
    }
}

impl From<jsonwebtoken::errors::Error> for DashboardError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        DashboardError::Token(err.to_string())
    }
}

impl DashboardError {
    /// Status code carried by an HTTP or server-reported error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::Api(ApiError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// API-specific errors
#[derive(Debug)]
pub enum ApiError {
    /// Network error (connection, timeout, etc.)
    Network(String),
    /// HTTP error with status code, either from the transport or from an
    /// `error` object in the response body
    Http { status: u16, message: String },
    /// Failed to parse response
    Parse(String),
    /// Request building failed
    Request(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timeout".to_string())
        } else if err.is_connect() {
            ApiError::Network(format!("Connection failed: {}", err))
        } else if err.is_builder() {
            ApiError::Request(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = DashboardError::from(ApiError::Http {
            status: 403,
            message: "Forbidden".to_string(),
        });
        assert_eq!(err.to_string(), "API error: HTTP 403 error: Forbidden");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_status_absent_for_non_http_errors() {
        assert_eq!(DashboardError::Config("missing".into()).status(), None);
        assert_eq!(
            DashboardError::Api(ApiError::Parse("bad".into())).status(),
            None
        );
    }
}
