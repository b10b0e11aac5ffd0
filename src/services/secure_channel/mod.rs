//! Mutually-authenticated request/response channel to the maze backend.
//!
//! The channel trusts exactly one pinned certificate (never the system CA
//! list) and presents a client identity from an embedded PKCS#12 keystore.
//! Each call to [`SecureChannel::send`] is a single exclusive exchange.

mod credentials;
mod transport;

pub use credentials::{CredentialSource, CredentialStore, Credentials, PinnedTls};
pub use transport::{ReqwestTransport, Transport};

use crate::constants::RESPONSE_SEPARATOR;
use reqwest::Url;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum ChannelFailure {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    ProtocolDecode(String),
}

/// Server-name checking applied on top of the pinned trust anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostnamePolicy {
    /// The certificate must name the backend host
    #[default]
    Strict,
    /// Accept any server name as long as the chain ends at the pinned anchor.
    /// Removes hostname verification; only for a fixed, known backend whose
    /// self-signed certificate does not carry its address.
    AcceptAnyForPinnedHost,
}

impl std::str::FromStr for HostnamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(HostnamePolicy::Strict),
            "accept-any-pinned-host" => Ok(HostnamePolicy::AcceptAnyForPinnedHost),
            _ => Err(format!(
                "Invalid hostname policy: {}. Use 'strict' or 'accept-any-pinned-host'",
                s
            )),
        }
    }
}

/// HTTP method together with the body it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post(String),
    Put(String),
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post(_) => "POST",
            Method::Put(_) => "PUT",
            Method::Delete => "DELETE",
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Method::Post(body) | Method::Put(body) => Some(body),
            Method::Get | Method::Delete => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    /// Appended to `https://<host>:<port>/`
    pub path: String,
    pub method: Method,
}

impl ChannelRequest {
    pub fn get(path: impl Into<String>) -> Self {
        ChannelRequest {
            path: path.into(),
            method: Method::Get,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        ChannelRequest {
            path: path.into(),
            method: Method::Post(body.into()),
        }
    }

    pub fn put(path: impl Into<String>, body: impl Into<String>) -> Self {
        ChannelRequest {
            path: path.into(),
            method: Method::Put(body.into()),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        ChannelRequest {
            path: path.into(),
            method: Method::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelResponse {
    pub status: u16,
    /// `None` when the body could not be read
    pub body: Option<String>,
}

impl ChannelResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Textual encoding `"<status> - <body>"`
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            self.status,
            RESPONSE_SEPARATOR,
            self.body.as_deref().unwrap_or_default()
        )
    }
}

impl fmt::Display for ChannelResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Extract the status code from a `"<status> - <body>"` encoded response
pub fn decode_response(text: &str) -> Result<u16, ChannelFailure> {
    let (code, _body) = text.split_once(RESPONSE_SEPARATOR).ok_or_else(|| {
        ChannelFailure::ProtocolDecode(format!(
            "missing '{}' separator in {:?}",
            RESPONSE_SEPARATOR, text
        ))
    })?;

    code.parse::<u16>().map_err(|e| {
        ChannelFailure::ProtocolDecode(format!("invalid status code {:?}: {}", code, e))
    })
}

/// Backend host and port; the scheme is always `https`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    pub host: String,
    pub port: u16,
}

impl BackendEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ChannelFailure> {
        let host = host.into();
        if host.is_empty() || host.contains("://") || host.contains('/') {
            return Err(ChannelFailure::InvalidEndpoint(format!(
                "expected a bare host name, got {:?}",
                host
            )));
        }
        Ok(BackendEndpoint { host, port })
    }

    /// Full URL for a request path suffix. The result always stays on this
    /// endpoint's host and port.
    pub fn url_for(&self, path: &str) -> Result<Url, ChannelFailure> {
        let base_raw = format!("https://{}:{}/", self.host, self.port);
        let base = Url::parse(&base_raw)
            .map_err(|e| ChannelFailure::InvalidEndpoint(format!("{}: {}", base_raw, e)))?;
        let url = base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ChannelFailure::InvalidEndpoint(format!("{}{}: {}", base, path, e)))?;

        // Host comparison uses the parsed form so `127.1` or IDN hosts match
        if url.scheme() != "https"
            || url.host() != base.host()
            || url.port_or_known_default() != base.port_or_known_default()
        {
            return Err(ChannelFailure::InvalidEndpoint(format!(
                "{} does not address {}",
                url, base
            )));
        }
        Ok(url)
    }
}

/// One logical channel to the backend. Requests through the same channel
/// never overlap.
pub struct SecureChannel<T = ReqwestTransport> {
    endpoint: BackendEndpoint,
    hostname_policy: HostnamePolicy,
    transport: T,
    exclusive: Mutex<()>,
}

impl SecureChannel<ReqwestTransport> {
    pub fn new(endpoint: BackendEndpoint, hostname_policy: HostnamePolicy) -> Self {
        Self::with_transport(endpoint, hostname_policy, ReqwestTransport::new())
    }
}

impl<T: Transport> SecureChannel<T> {
    pub fn with_transport(
        endpoint: BackendEndpoint,
        hostname_policy: HostnamePolicy,
        transport: T,
    ) -> Self {
        if hostname_policy == HostnamePolicy::AcceptAnyForPinnedHost {
            tracing::warn!(
                host = %endpoint.host,
                "Secure channel to {} configured without hostname verification",
                endpoint.host
            );
        }
        SecureChannel {
            endpoint,
            hostname_policy,
            transport,
            exclusive: Mutex::new(()),
        }
    }

    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform one exchange.
    ///
    /// Fails with `MissingCredentials` before any connection attempt when
    /// either asset is absent. Every failure is logged and returned as-is;
    /// callers must treat it as "no answer".
    pub async fn send(
        &self,
        request: &ChannelRequest,
        credentials: &Credentials,
    ) -> Result<ChannelResponse, ChannelFailure> {
        let method = request.method.as_str();
        let url = self.endpoint.url_for(&request.path)?;

        let tls = credentials.pinned(self.hostname_policy).map_err(|e| {
            tracing::warn!(method, path = %request.path, "Refusing to connect: {}", e);
            e
        })?;

        let _exclusive = self.exclusive.lock().await;
        tracing::debug!(method, path = %request.path, "{} {}", method, url);

        match self.transport.exchange(&url, &request.method, &tls).await {
            Ok(response) => {
                tracing::debug!(
                    method,
                    status = response.status,
                    "{} {} answered {}",
                    method,
                    request.path,
                    response.status
                );
                Ok(response)
            }
            Err(e) => {
                tracing::error!(method, path = %request.path, "{} {} failed: {}", method, url, e);
                Err(e)
            }
        }
    }
}

impl<T: Transport + 'static> SecureChannel<T> {
    /// Run one exchange as a background task and hand the outcome to
    /// `on_complete` once it finishes. There is no cancellation.
    pub fn spawn_send<F>(
        self: Arc<Self>,
        request: ChannelRequest,
        credentials: Credentials,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<ChannelResponse, ChannelFailure>) + Send + 'static,
    {
        tokio::spawn(async move {
            let outcome = self.send(&request, &credentials).await;
            on_complete(outcome);
        })
    }
}
