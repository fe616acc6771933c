//! Lightweight OAuth2 Authorization Code flow for desktop use.
//!
//! 1. Opens the browser to the authorization URL
//! 2. Starts a tiny localhost HTTP server to receive the callback
//! 3. Exchanges the code for an access token (+ refresh token)
//! 4. Stores tokens in the OS keyring

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::TcpListener;

use super::keyring_store;
use crate::error::OAuthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp of expiry.
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub service_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
    pub redirect_port: u16,
}

impl OAuthConfig {
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    pub fn auth_url_full(&self) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencode(&self.client_id),
            urlencode(&self.redirect_uri()),
            urlencode(&scopes),
        )
    }
}

/// Run the full flow: open browser -> listen for callback -> exchange code.
pub async fn authorize(config: &OAuthConfig) -> Result<OAuthTokens, OAuthError> {
    let auth_url = config.auth_url_full();
    open::that(&auth_url).map_err(|e| OAuthError::AuthorizationFailed(e.to_string()))?;

    let listener = TcpListener::bind(format!("127.0.0.1:{}", config.redirect_port))
        .map_err(|e| OAuthError::AuthorizationFailed(e.to_string()))?;

    let (mut stream, _) = listener
        .accept()
        .map_err(|e| OAuthError::AuthorizationFailed(e.to_string()))?;
    let mut buf = [0u8; 4096];
    let n = stream
        .read(&mut buf)
        .map_err(|e| OAuthError::AuthorizationFailed(e.to_string()))?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let code = extract_code(&request)
        .ok_or_else(|| OAuthError::AuthorizationFailed("no code in callback".to_string()))?;

    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html><body><h2>Authentication successful!</h2><p>You can close this tab.</p></body></html>";
    let _ = stream.write_all(response.as_bytes());
    drop(stream);
    drop(listener);

    let tokens = exchange_code(config, &code).await?;
    store_tokens(&config.service_name, &tokens)?;
    Ok(tokens)
}

async fn exchange_code(config: &OAuthConfig, code: &str) -> Result<OAuthTokens, OAuthError> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", &config.redirect_uri()),
    ];
    request_tokens(&config.token_url, &params, None)
        .await
        .map_err(OAuthError::TokenExchangeFailed)
}

/// Refresh an access token and persist the result.
pub async fn refresh_token(config: &OAuthConfig, refresh: &str) -> Result<OAuthTokens, OAuthError> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", refresh),
        ("grant_type", "refresh_token"),
    ];
    let tokens = request_tokens(&config.token_url, &params, Some(refresh))
        .await
        .map_err(OAuthError::TokenRefreshFailed)?;
    store_tokens(&config.service_name, &tokens)?;
    Ok(tokens)
}

async fn request_tokens(
    token_url: &str,
    params: &[(&str, &str)],
    fallback_refresh: Option<&str>,
) -> Result<OAuthTokens, String> {
    let resp = Client::new()
        .post(token_url)
        .form(params)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let body: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(error) = body.get("error") {
        return Err(error.to_string());
    }

    let expires_at = body
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .map(|ei| chrono::Utc::now().timestamp() + ei);

    Ok(OAuthTokens {
        access_token: body["access_token"].as_str().unwrap_or_default().to_string(),
        refresh_token: body
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| fallback_refresh.map(String::from)),
        expires_at,
        token_type: body["token_type"].as_str().unwrap_or("Bearer").to_string(),
        scope: body.get("scope").and_then(|v| v.as_str()).map(String::from),
    })
}

fn store_tokens(service_name: &str, tokens: &OAuthTokens) -> Result<(), OAuthError> {
    let json = serde_json::to_string(tokens)
        .map_err(|e| OAuthError::TokenExchangeFailed(e.to_string()))?;
    keyring_store::set(service_name, &json)
        .map_err(|e| OAuthError::TokenExchangeFailed(e.to_string()))
}

/// Load stored tokens from keyring.
pub fn load_tokens(service_name: &str) -> Option<OAuthTokens> {
    keyring_store::get(service_name)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok())
}

/// Whether stored tokens are expired (with 60s slack).
pub fn is_expired(tokens: &OAuthTokens) -> bool {
    match tokens.expires_at {
        Some(exp) => chrono::Utc::now().timestamp() > exp - 60,
        None => false,
    }
}

fn extract_code(request: &str) -> Option<String> {
    let first_line = request.lines().next()?;
    let path = first_line.split_whitespace().nth(1)?;
    let url = url::Url::parse(&format!("http://localhost{path}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_key_only(s)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code() {
        let req = "GET /callback?code=abc123&scope=x HTTP/1.1\r\nHost: localhost\r\n";
        assert_eq!(extract_code(req).as_deref(), Some("abc123"));
        assert!(extract_code("GET /callback?state=x HTTP/1.1").is_none());
    }

    #[test]
    fn test_auth_url_contains_scopes() {
        let config = OAuthConfig {
            service_name: "google".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
            redirect_port: 19824,
        };
        let url = config.auth_url_full();
        assert!(url.contains("response_type=code"));
        assert!(url.contains("19824"));
    }

    #[test]
    fn test_expiry_check() {
        let mut tokens = OAuthTokens {
            access_token: "t".to_string(),
            refresh_token: None,
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
            token_type: "Bearer".to_string(),
            scope: None,
        };
        assert!(!is_expired(&tokens));
        tokens.expires_at = Some(chrono::Utc::now().timestamp() - 10);
        assert!(is_expired(&tokens));
        tokens.expires_at = None;
        assert!(!is_expired(&tokens));
    }
}
