//! In-process fake of the Instant On web management interface.
//!
//! Mirrors the device behaviour the client depends on: the root page
//! redirects into a session prefix, the login sets a session cookie and the
//! download endpoint refuses requests without that cookie.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};

pub const PRIVATE_KEY: &str = include_str!("../fixtures/switch_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/switch_key.pub.pem");

pub const USER: &str = "admin";
pub const PASSWORD: &str = "s3cret";
pub const LOGIN_TOKEN: &str = "7f3a9c01";
pub const SESSION_PREFIX: &str = "cs4d2e91";
const SESSION_COOKIE: &str = "sessionID=4b1d7e02";

/// Answer of the download endpoint for one configuration kind.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Status(u16, String),
    /// Announces `promised` bytes, sends `sent` and drops the connection.
    Truncated { promised: usize, sent: String },
    /// Redirects to a port on which nothing listens.
    Unreachable,
}

/// Behaviour of the fake switch.
#[derive(Debug, Clone)]
pub struct SwitchBehavior {
    pub encryption: bool,
    /// Omit `rsaPublicKey` although encryption is enabled.
    pub omit_public_key: bool,
    /// Redirect target of the root page.
    pub redirect_to: String,
    /// Forces the login endpoint to answer with this HTTP status.
    pub login_http_status: Option<u16>,
    pub running: Reply,
    pub startup: Reply,
}

impl Default for SwitchBehavior {
    fn default() -> Self {
        Self {
            encryption: false,
            omit_public_key: false,
            redirect_to: format!("/{SESSION_PREFIX}/hpe/config/login.htm"),
            login_http_status: None,
            running: Reply::Body(running_config("sw-floor2")),
            startup: Reply::Body(running_config("sw-floor2")),
        }
    }
}

/// Requests observed by the fake switch.
#[derive(Debug, Default, Clone)]
pub struct Observed {
    pub root_hits: usize,
    pub encryption_queries: Vec<String>,
    pub login_queries: Vec<String>,
    pub decrypted_creds: Vec<String>,
    pub downloads: Vec<String>,
    pub downloads_without_cookie: usize,
}

struct Shared {
    behavior: SwitchBehavior,
    observed: Mutex<Observed>,
}

/// Running fake switch bound to a random local port.
pub struct FakeSwitch {
    port: u16,
    shared: Arc<Shared>,
}

impl FakeSwitch {
    pub async fn start(behavior: SwitchBehavior) -> Self {
        let shared = Arc::new(Shared {
            behavior,
            observed: Mutex::new(Observed::default()),
        });

        let app = Router::new()
            .route("/", get(root))
            .route(
                &format!("/{SESSION_PREFIX}/hpe/config/login.htm"),
                get(login_page),
            )
            .route("/nowhere/index.htm", get(login_page))
            .route("/device/wcd", get(encryption_settings))
            .route("/system.xml", get(login))
            .route(&format!("/{SESSION_PREFIX}/hpe/http_download"), get(download))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake switch");
        let port = listener.local_addr().expect("local addr").port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake switch");
        });

        Self { port, shared }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn observed(&self) -> Observed {
        self.shared.observed.lock().expect("observed lock").clone()
    }
}

/// A running configuration of realistic size naming `hostname`.
pub fn running_config(hostname: &str) -> String {
    let mut text = String::from(
        "! version 1.0.5.41\n! System Description \"Aruba Instant On 1830 24G 2SFP Switch JL813A\"\nconfig-file-header\n",
    );
    text.push_str(&format!("hostname \"{hostname}\"\n"));
    for port in 1..=8 {
        text.push_str(&format!(
            "interface GigabitEthernet{port}\n description \"access-{port}\"\n switchport mode access\nexit\n"
        ));
    }
    text
}

/// Port on which nothing listens.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    listener.local_addr().expect("local addr").port()
}

fn status_xml(code: i64, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ResponseData>\n<ActionStatus>\n<version>1.0</version>\n<requestURL>system.xml</requestURL>\n<statusCode>{code}</statusCode>\n<deviceStatusCode>0</deviceStatusCode>\n<statusString>{message}</statusString>\n</ActionStatus>\n</ResponseData>\n"
    )
}

async fn root(State(shared): State<Arc<Shared>>) -> Redirect {
    shared.observed.lock().expect("observed lock").root_hits += 1;
    Redirect::to(&shared.behavior.redirect_to)
}

async fn login_page() -> &'static str {
    "<html><body>Instant On</body></html>"
}

async fn encryption_settings(
    State(shared): State<Arc<Shared>>,
    RawQuery(query): RawQuery,
) -> Response {
    shared
        .observed
        .lock()
        .expect("observed lock")
        .encryption_queries
        .push(query.unwrap_or_default());

    let behavior = &shared.behavior;
    let mut fields = format!(
        "<passwEncryptEnable>{}</passwEncryptEnable>",
        if behavior.encryption { "1" } else { "0" }
    );
    if behavior.encryption {
        if !behavior.omit_public_key {
            fields.push_str(&format!("<rsaPublicKey>{PUBLIC_KEY}</rsaPublicKey>"));
        }
        fields.push_str(&format!("<loginToken>{LOGIN_TOKEN}</loginToken>"));
    }
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ResponseData><DeviceConfiguration><EncryptionSetting>{fields}</EncryptionSetting></DeviceConfiguration></ResponseData>"
    );
    ([(header::CONTENT_TYPE, "text/xml")], xml).into_response()
}

async fn login(State(shared): State<Arc<Shared>>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    let behavior = &shared.behavior;

    if let Some(status) = behavior.login_http_status {
        let status = StatusCode::from_u16(status).expect("status code");
        return (status, "login handler crashed").into_response();
    }

    let accepted = if behavior.encryption {
        let credentials = query
            .strip_prefix("action=login&cred=")
            .and_then(|cred| hex::decode(cred).ok())
            .and_then(|cipher| {
                let key = RsaPrivateKey::from_pkcs8_pem(PRIVATE_KEY).ok()?;
                key.decrypt(Pkcs1v15Encrypt, &cipher).ok()
            })
            .and_then(|plain| String::from_utf8(plain).ok())
            .unwrap_or_default();
        let accepted = credentials
            == format!("user={USER}&password={PASSWORD}&ssd=true&token={LOGIN_TOKEN}&");
        let mut observed = shared.observed.lock().expect("observed lock");
        observed.decrypted_creds.push(credentials);
        observed.login_queries.push(query.clone());
        accepted
    } else {
        shared
            .observed
            .lock()
            .expect("observed lock")
            .login_queries
            .push(query.clone());
        query == format!("action=login&user={USER}&password={PASSWORD}&ssd=true&")
    };

    if accepted {
        (
            [
                (header::CONTENT_TYPE, "text/xml".to_string()),
                (header::SET_COOKIE, format!("{SESSION_COOKIE}; path=/")),
            ],
            status_xml(0, "OK"),
        )
            .into_response()
    } else {
        ([(header::CONTENT_TYPE, "text/xml")], status_xml(12, "Bad User or Password"))
            .into_response()
    }
}

async fn download(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let query = query.unwrap_or_default();
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("sessionID="));
    {
        let mut observed = shared.observed.lock().expect("observed lock");
        observed.downloads.push(query.clone());
        if !has_cookie {
            observed.downloads_without_cookie += 1;
        }
    }
    if !has_cookie {
        return (StatusCode::FORBIDDEN, "not logged in").into_response();
    }

    let reply = match query.as_str() {
        "action=2&ssd=4" => &shared.behavior.running,
        "action=3&ssd=4" => &shared.behavior.startup,
        _ => return (StatusCode::BAD_REQUEST, "unknown action").into_response(),
    };
    match reply {
        Reply::Body(text) => text.clone().into_response(),
        Reply::Status(status, body) => {
            let status = StatusCode::from_u16(*status).expect("status code");
            (status, body.clone()).into_response()
        }
        Reply::Truncated { promised, sent } => {
            let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                Ok(Bytes::from(sent.clone())),
                Err(std::io::Error::other("connection dropped")),
            ];
            axum::http::Response::builder()
                .header(header::CONTENT_LENGTH, *promised)
                .body(Body::from_stream(futures::stream::iter(chunks)))
                .expect("truncated response")
        }
        Reply::Unreachable => {
            let port = closed_port().await;
            Redirect::to(&format!("http://127.0.0.1:{port}/hpe/http_download?{query}"))
                .into_response()
        }
    }
}
