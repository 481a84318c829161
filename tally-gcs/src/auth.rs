//! File-backed OAuth credentials for the storage API.
//!
//! Persists a [`TokenCache`] JSON document at the configured credentials
//! path. Writes use the same atomic `.tmp` + rename pattern as the rest of
//! the tool's state files. Access tokens are refreshed through the OAuth
//! token endpoint named in the client-secret file; the tool never runs an
//! interactive authorization flow, so the cache must already hold a refresh
//! token.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{api_err, io_err, GcsError};

/// Read-only access is all the audit needs.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_only";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this many seconds before the recorded expiry so a token does not
/// lapse mid-request.
const EXPIRY_MARGIN_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Capability seam
// ---------------------------------------------------------------------------

/// Source of bearer tokens for the storage API.
///
/// Injected into the lister so credential acquisition stays outside the
/// listing logic.
pub trait TokenProvider {
    fn access_token(&self) -> Result<String, GcsError>;
}

// ---------------------------------------------------------------------------
// On-disk formats
// ---------------------------------------------------------------------------

/// On-disk token cache payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCache {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix seconds at which `access_token` stops being valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SecretFile {
    installed: InstalledSecret,
}

#[derive(Debug, Deserialize)]
struct InstalledSecret {
    client_id: String,
    client_secret: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

// ---------------------------------------------------------------------------
// Stored credentials
// ---------------------------------------------------------------------------

/// Token provider backed by a cache file and an installed-application
/// client-secret file.
pub struct StoredCredentials {
    credentials_path: PathBuf,
    secret_path: PathBuf,
    scopes: Vec<String>,
    agent: ureq::Agent,
}

impl StoredCredentials {
    pub fn new(credentials_path: impl Into<PathBuf>, secret_path: impl Into<PathBuf>) -> Self {
        Self::with_scopes(credentials_path, secret_path, vec![DEFAULT_SCOPE.to_string()])
    }

    pub fn with_scopes(
        credentials_path: impl Into<PathBuf>,
        secret_path: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            secret_path: secret_path.into(),
            scopes,
            agent: ureq::agent(),
        }
    }

    fn refresh(&self, cache: &TokenCache) -> Result<TokenCache, GcsError> {
        let refresh_token = cache.refresh_token.as_deref().ok_or_else(|| {
            GcsError::Auth(format!(
                "no refresh token in {}; authorize this client for scope(s) {} and store the \
                 resulting refresh token there",
                self.credentials_path.display(),
                self.scopes.join(" "),
            ))
        })?;
        let secret = load_secret(&self.secret_path)?;
        let scope = self.scopes.join(" ");

        debug!("refreshing access token via {}", secret.installed.token_uri);
        let response = self
            .agent
            .post(&secret.installed.token_uri)
            .send_form(&[
                ("client_id", secret.installed.client_id.as_str()),
                ("client_secret", secret.installed.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
                ("scope", scope.as_str()),
            ])
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    GcsError::Auth(format!("token refresh failed with HTTP status {code}"))
                }
                transport => api_err(transport),
            })?;

        let refreshed: RefreshResponse = response
            .into_json()
            .map_err(|e| GcsError::Auth(format!("malformed token response: {e}")))?;

        Ok(TokenCache {
            access_token: Some(refreshed.access_token),
            refresh_token: cache.refresh_token.clone(),
            expires_at: Some(unix_now() + refreshed.expires_in),
        })
    }
}

impl TokenProvider for StoredCredentials {
    fn access_token(&self) -> Result<String, GcsError> {
        let cache = load_cache(&self.credentials_path)?;
        if let Some(token) = usable_token(&cache, unix_now()) {
            return Ok(token);
        }

        let refreshed = self.refresh(&cache)?;
        save_cache(&self.credentials_path, &refreshed)?;
        refreshed
            .access_token
            .ok_or_else(|| GcsError::Auth("token refresh yielded no access token".to_string()))
    }
}

/// A cached token is usable when present and not within the expiry margin.
/// A token without a recorded expiry is assumed valid.
fn usable_token(cache: &TokenCache, now: u64) -> Option<String> {
    let token = cache.access_token.clone()?;
    match cache.expires_at {
        Some(expires_at) if now + EXPIRY_MARGIN_SECS >= expires_at => None,
        _ => Some(token),
    }
}

// ---------------------------------------------------------------------------
// Credential files
// ---------------------------------------------------------------------------

fn load_secret(path: &Path) -> Result<SecretFile, GcsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load the token cache.
pub fn load_cache(path: &Path) -> Result<TokenCache, GcsError> {
    if !path.exists() {
        return Err(GcsError::Auth(format!(
            "credentials file not found at {}; store a refresh token there first",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the token cache atomically: write to a `.tmp` sibling, then rename.
pub fn save_cache(path: &Path, cache: &TokenCache) -> Result<(), GcsError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "credentials".to_string());
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    let json = serde_json::to_string_pretty(cache)?;
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn cache_roundtrip_save_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".tally.credentials");
        let cache = TokenCache {
            access_token: Some("abc".to_string()),
            refresh_token: Some("r1".to_string()),
            expires_at: Some(1_900_000_000),
        };

        save_cache(&path, &cache).expect("save");
        let loaded = load_cache(&path).expect("load");
        assert_eq!(loaded, cache);
    }

    #[test]
    fn save_leaves_no_tmp_file_behind() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".tally.credentials");
        save_cache(&path, &TokenCache::default()).expect("save");

        let tmp = dir.path().join(".tally.credentials.tmp");
        assert!(!tmp.exists(), "tmp file should be renamed away");
    }

    #[test]
    fn missing_cache_file_is_an_auth_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_cache(&dir.path().join("nope")).expect_err("must fail");
        assert!(matches!(err, GcsError::Auth(_)));
    }

    #[test]
    fn unexpired_token_is_usable() {
        let cache = TokenCache {
            access_token: Some("abc".to_string()),
            refresh_token: None,
            expires_at: Some(1_000_000),
        };
        assert_eq!(usable_token(&cache, 900_000), Some("abc".to_string()));
    }

    #[test]
    fn token_inside_expiry_margin_is_not_usable() {
        let cache = TokenCache {
            access_token: Some("abc".to_string()),
            refresh_token: None,
            expires_at: Some(1_000_000),
        };
        assert_eq!(usable_token(&cache, 1_000_000 - EXPIRY_MARGIN_SECS), None);
        assert_eq!(usable_token(&cache, 2_000_000), None);
    }

    #[test]
    fn token_without_expiry_is_assumed_valid() {
        let cache = TokenCache {
            access_token: Some("abc".to_string()),
            refresh_token: None,
            expires_at: None,
        };
        assert_eq!(usable_token(&cache, u64::MAX), Some("abc".to_string()));
    }

    #[test]
    fn refresh_without_refresh_token_is_an_auth_error() {
        let dir = TempDir::new().expect("tempdir");
        let credentials = dir.path().join(".tally.credentials");
        fs::write(&credentials, "{}").expect("write cache");

        let provider = StoredCredentials::new(&credentials, dir.path().join("secrets.json"));
        let err = provider.access_token().expect_err("must fail");
        assert!(matches!(err, GcsError::Auth(_)));
    }

    /// Answer one HTTP request with a canned JSON body; return the raw
    /// request (head + body) for assertions.
    fn serve_json_once(body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            let header_end = loop {
                let n = stream.read(&mut buf).expect("read");
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&request[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            while request.len() < header_end + content_length {
                let n = stream.read(&mut buf).expect("read body");
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).expect("write");
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn refresh_exchanges_refresh_token_and_rewrites_cache() {
        let dir = TempDir::new().expect("tempdir");
        let credentials = dir.path().join(".tally.credentials");
        fs::write(&credentials, r#"{"refresh_token":"r1"}"#).expect("write cache");

        let (endpoint, server) = serve_json_once(r#"{"access_token":"fresh","expires_in":900}"#);
        let secret = dir.path().join("secrets.json");
        fs::write(
            &secret,
            format!(
                r#"{{"installed":{{"client_id":"cid","client_secret":"cs","token_uri":"{endpoint}/token"}}}}"#
            ),
        )
        .expect("write secret");

        let provider = StoredCredentials::new(&credentials, &secret);
        let token = provider.access_token().expect("token");
        assert_eq!(token, "fresh");

        let request = server.join().expect("server thread");
        assert!(request.contains("grant_type=refresh_token"));
        assert!(request.contains("refresh_token=r1"));
        assert!(request.contains("client_id=cid"));

        let rewritten = load_cache(&credentials).expect("reload");
        assert_eq!(rewritten.access_token.as_deref(), Some("fresh"));
        assert_eq!(rewritten.refresh_token.as_deref(), Some("r1"));
        assert!(rewritten.expires_at.is_some());
    }
}
