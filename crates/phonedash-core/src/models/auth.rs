use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success body of `POST /auth/get_token`.
/// Only `access_token` and `user_name` are required; anything else the
/// server adds is ignored.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user_name: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("user_name", &self.user_name)
            .field("token_type", &self.token_type)
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl TokenResponse {
    /// Parse the advertised expiration.
    /// The server sends a naive UTC timestamp (`2024-03-01 17:45:12.345678`);
    /// RFC 3339 is accepted too. Unparseable values yield `None`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiration.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_minimal_token_response() {
        let json = r#"{"access_token": "tok123", "user_name": "Alice"}"#;
        let resp: TokenResponse = serde_json::from_str(json).expect("Failed to parse token JSON");
        assert_eq!(resp.access_token, "tok123");
        assert_eq!(resp.user_name, "Alice");
        assert_eq!(resp.expires_at(), None);
    }

    #[test]
    fn test_parse_full_token_response() {
        let json = r#"{"access_token": "eyJ0eXAi", "user_name": "localadmin", "token_type": "bearer", "expiration": "2024-03-01 17:45:12.345678", "extra": 1}"#;
        let resp: TokenResponse = serde_json::from_str(json).expect("Failed to parse token JSON");
        assert_eq!(resp.token_type.as_deref(), Some("bearer"));
        let expiry = resp.expires_at().expect("expiration should parse");
        assert_eq!(expiry.year(), 2024);
        assert_eq!(expiry.hour(), 17);
        assert_eq!(expiry.minute(), 45);
    }

    #[test]
    fn test_expiration_formats() {
        let mut resp = TokenResponse {
            access_token: "t".to_string(),
            user_name: "u".to_string(),
            token_type: None,
            expiration: Some("2024-03-01T17:45:12Z".to_string()),
        };
        assert!(resp.expires_at().is_some());

        resp.expiration = Some("2024-03-01 17:45:12".to_string());
        assert!(resp.expires_at().is_some());

        resp.expiration = Some("tomorrow".to_string());
        assert_eq!(resp.expires_at(), None);
    }

    #[test]
    fn test_missing_token_is_error() {
        let json = r#"{"user_name": "Alice"}"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let json = r#"{"access_token": "secret-token", "user_name": "Alice"}"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert!(!format!("{:?}", resp).contains("secret-token"));
    }
}
