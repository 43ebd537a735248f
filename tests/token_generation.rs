//! Token Generation Tests
//!
//! Verifies signed dashboard tokens and the settings that cache them.

use ciscobd_sdk::{decode_token, generate_token, DashboardSettings, DASHBOARD_AUDIENCE};

const SECRET: &str = "b3PoEaZ1rCK39L8IfZmXGWu9vE1paNwo";

// ============================================================================
// Token Generator Tests
// ============================================================================

#[test]
fn test_token_header_and_claims() {
    let token = generate_token(
        "615ac54546dbad0607af8416",
        SECRET,
        Some("4f1c2f2e-8a3a-4f7e-9d58-7a2d9c0f3b11"),
        "cbd.example.com",
        "1.0",
        3600,
    )
    .unwrap();

    let (header, claims) = decode_token(&token, SECRET).unwrap();
    assert_eq!(header.kid.as_deref(), Some("615ac54546dbad0607af8416"));
    assert_eq!(claims.iss, "cbd.example.com");
    assert_eq!(claims.cid, "4f1c2f2e-8a3a-4f7e-9d58-7a2d9c0f3b11");
    assert_eq!(claims.appver, "1.0");
    assert_eq!(claims.aud, DASHBOARD_AUDIENCE);
    assert_eq!(claims.exp - claims.iat, 3600);
    assert!(!claims.is_expired());
}

#[test]
fn test_expiry_follows_lifetime() {
    for lifetime in [60, 900, 86_400] {
        let token = generate_token("kid", SECRET, None, "app", "1.0", lifetime).unwrap();
        let (_, claims) = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.exp, claims.iat + lifetime as i64);
    }
}

#[test]
fn test_generated_client_ids_differ() {
    let first = generate_token("kid", SECRET, None, "app", "1.0", 60).unwrap();
    let second = generate_token("kid", SECRET, None, "app", "1.0", 60).unwrap();

    let (_, first) = decode_token(&first, SECRET).unwrap();
    let (_, second) = decode_token(&second, SECRET).unwrap();
    assert_ne!(first.cid, second.cid);
}

#[test]
fn test_empty_secret_fails() {
    let err = generate_token("kid", "", None, "app", "1.0", 60).unwrap_err();
    assert!(err.to_string().contains("Secret"));
}

#[test]
fn test_tampered_token_is_rejected() {
    let token = generate_token("kid", SECRET, None, "app", "1.0", 60).unwrap();
    let mut parts: Vec<&str> = token.split('.').collect();
    let other = generate_token("kid", SECRET, Some("someone-else"), "app", "1.0", 60).unwrap();
    let other_payload = other.split('.').nth(1).unwrap().to_string();
    parts[1] = &other_payload;

    assert!(decode_token(&parts.join("."), SECRET).is_err());
}

// ============================================================================
// Settings Holder Tests
// ============================================================================

#[test]
fn test_settings_token_uses_session_client_id() {
    let mut settings = DashboardSettings::new("cbd.example.com", 443, "kid", SECRET);
    let client_id = settings.client_id().to_string();

    let token = settings.current_token().unwrap().to_string();
    let (_, claims) = decode_token(&token, SECRET).unwrap();
    assert_eq!(claims.cid, client_id);

    settings.set_host("cbd2.example.com");
    let token = settings.current_token().unwrap().to_string();
    let (_, claims) = decode_token(&token, SECRET).unwrap();
    assert_eq!(claims.cid, client_id);
}

#[test]
fn test_each_auth_field_marks_token_stale() {
    let mut settings = DashboardSettings::new("cbd.example.com", 443, "kid", SECRET);

    let writes: Vec<Box<dyn Fn(&mut DashboardSettings)>> = vec![
        Box::new(|s| s.set_host("other.example.com")),
        Box::new(|s| s.set_port(8443)),
        Box::new(|s| s.set_key_id("kid-2")),
        Box::new(|s| s.set_secret(SECRET)),
    ];

    for write in writes {
        settings.current_token().unwrap();
        assert!(!settings.is_stale());
        write(&mut settings);
        assert!(settings.is_stale());
    }
}

#[test]
fn test_explicit_refresh_replaces_installed_token() {
    let mut settings = DashboardSettings::new("cbd.example.com", 443, "kid", SECRET);
    settings.set_token("installed");
    assert_eq!(settings.current_token().unwrap(), "installed");

    let refreshed = settings.refresh().unwrap().to_string();
    assert_ne!(refreshed, "installed");
    assert!(decode_token(&refreshed, SECRET).is_ok());
}
