use super::{ChannelFailure, ChannelResponse, HostnamePolicy, Method, PinnedTls};
use async_trait::async_trait;
use reqwest::{Body, Certificate, Client, Identity, Url};
use std::time::Duration;

/// Performs one request/response exchange over an authenticated TLS session.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(
        &self,
        url: &Url,
        method: &Method,
        tls: &PinnedTls<'_>,
    ) -> Result<ChannelResponse, ChannelFailure>;
}

/// reqwest/native-tls transport. A fresh client is built for every exchange,
/// trusting only the pinned anchor and presenting the PKCS#12 identity.
/// The client and its connection are dropped when the exchange returns,
/// whichever step failed.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport { timeout: None }
    }

    /// Overall request timeout; without one the transport defaults apply.
    pub fn with_timeout(timeout: Duration) -> Self {
        ReqwestTransport {
            timeout: Some(timeout),
        }
    }

    fn build_client(&self, tls: &PinnedTls<'_>) -> Result<Client, ChannelFailure> {
        let identity = Identity::from_pkcs12_der(tls.client_identity, tls.password)
            .map_err(|e| ChannelFailure::InvalidCredentials(format!("client keystore: {}", e)))?;
        let anchor = parse_trust_anchor(tls.trust_anchor)?;

        let mut builder = Client::builder()
            .use_native_tls()
            .tls_built_in_root_certs(false)
            .add_root_certificate(anchor)
            .identity(identity)
            .https_only(true);

        match tls.hostname_policy {
            HostnamePolicy::Strict => {}
            HostnamePolicy::AcceptAnyForPinnedHost => {
                tracing::warn!(
                    "Hostname verification disabled; relying on the pinned trust anchor alone"
                );
                builder = builder.danger_accept_invalid_hostnames(true);
            }
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| ChannelFailure::Transport(format!("Failed to build TLS client: {}", e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn exchange(
        &self,
        url: &Url,
        method: &Method,
        tls: &PinnedTls<'_>,
    ) -> Result<ChannelResponse, ChannelFailure> {
        let client = self.build_client(tls)?;

        let request = match method {
            Method::Get => client.get(url.clone()),
            Method::Delete => client.delete(url.clone()),
            Method::Post(body) => client.post(url.clone()).body(chunked(body)),
            Method::Put(body) => client.put(url.clone()).body(chunked(body)),
        };

        let response = request
            .send()
            .await
            .map_err(|e| ChannelFailure::Transport(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        tracing::debug!(status, "Response status {} from {}", status, url);

        // A body that cannot be read still yields the status code
        let body = match response.text().await {
            Ok(text) => Some(join_lines(&text)),
            Err(e) => {
                tracing::warn!(status, "Failed to read response body: {}", e);
                None
            }
        };

        Ok(ChannelResponse { status, body })
    }
}

/// Wrap the payload in a stream of unknown length so it goes out with
/// chunked transfer encoding.
fn chunked(body: &str) -> Body {
    let bytes = body.as_bytes().to_vec();
    Body::wrap_stream(futures::stream::iter(vec![Ok::<_, std::io::Error>(bytes)]))
}

/// Concatenate response lines without separators
fn join_lines(text: &str) -> String {
    text.lines().collect()
}

fn parse_trust_anchor(bytes: &[u8]) -> Result<Certificate, ChannelFailure> {
    let parsed = if bytes.starts_with(b"-----BEGIN") {
        Certificate::from_pem(bytes)
    } else {
        Certificate::from_der(bytes)
    };
    parsed.map_err(|e| ChannelFailure::InvalidCredentials(format!("trust anchor: {}", e)))
}
