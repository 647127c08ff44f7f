//! HTTP session handling for Instant On switches.
//!
//! A [`SwitchSession`] drives the whole conversation with one switch: it
//! discovers the per-login session prefix, negotiates the (optionally RSA
//! encrypted) login and downloads the running and startup configurations.
//!
//! # Main Components
//!
//! - [`SwitchSession`] - One switch, one cookie-bearing HTTP client
//! - [`encrypt_credentials`] - PKCS#1 v1.5 encryption of the login blob
//! - [`extract_hostname`] - Hostname lookup in a running configuration
//! - [`build_login_path`] - Login URL construction for both login shapes

use log::{debug, info, warn};
use reqwest::{Client, Response};
use std::fmt;
use std::time::Duration;

use crate::config;
use crate::device::{EncryptionSettings, StatusResult};
use crate::error::SwitchError;

pub use auth::{build_login_path, session_prefix_from_path};
pub use crypto::{encrypt_credentials, parse_public_key};
pub use download::extract_hostname;

/// Session with a single switch.
///
/// The session owns its HTTP client and therefore its cookie jar. The device
/// binds the login to that cookie, so every request of one backup run must go
/// through the same session. Operations that talk to the device take
/// `&mut self`; a session never has two requests in flight.
pub struct SwitchSession {
    host: String,
    port: u16,
    username: String,
    password: String,
    base_url: String,
    http: Client,

    /// Path segment(s) in front of `hpe/`, discovered once per session.
    session_prefix: Option<String>,
}

impl SwitchSession {
    /// Creates a session for `host:port`. No request is issued yet.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SwitchError> {
        let host = host.into();
        let http = Client::builder().cookie_store(true).build()?;
        let base_url = base_url(&host, port);

        Ok(Self {
            host,
            port,
            username: username.into(),
            password: password.into(),
            base_url,
            http,
            session_prefix: None,
        })
    }

    /// Host or IP address the session was created for.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Session prefix, if it has been discovered already.
    pub fn session_prefix(&self) -> Option<&str> {
        self.session_prefix.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get(&self, path: &str, timeout: Option<Duration>) -> Result<Response, SwitchError> {
        let url = self.url(path);
        debug!("GET {}", redact(&url));

        let mut request = self.http.get(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        debug!(
            "GET done: HTTP {} {}",
            response.status().as_u16(),
            redact(response.url().as_str())
        );
        Ok(response)
    }

    /// Issues a GET and returns the body, failing on non-OK statuses.
    async fn get_text(&self, path: &str) -> Result<String, SwitchError> {
        let response = self.get(path, None).await?;
        read_ok_body(response).await
    }
}

impl fmt::Debug for SwitchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchSession")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("session_prefix", &self.session_prefix)
            .finish_non_exhaustive()
    }
}

fn base_url(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{host}]:{port}/")
    } else {
        format!("http://{host}:{port}/")
    }
}

/// Whether the device would consider this status a delivered answer.
fn is_ok_status(response: &Response) -> bool {
    let status = response.status();
    !(status.is_client_error() || status.is_server_error())
}

/// Turns a non-OK response into an error that keeps the raw body.
async fn status_error(response: Response) -> SwitchError {
    let url = redact(response.url().as_str());
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SwitchError::HttpStatus { url, status, body }
}

async fn read_ok_body(response: Response) -> Result<String, SwitchError> {
    if !is_ok_status(&response) {
        return Err(status_error(response).await);
    }
    Ok(response.text().await?)
}

/// Strips the credential part of login URLs before they reach a log line.
fn redact(url: &str) -> String {
    match url.find("action=login") {
        Some(idx) => format!("{}action=login&<redacted>", &url[..idx]),
        None => url.to_string(),
    }
}

mod auth;
mod crypto;
mod download;
