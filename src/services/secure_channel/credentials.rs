use super::{ChannelFailure, HostnamePolicy};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Client identity and pinned trust anchor for one exchange.
///
/// `client_identity` is a PKCS#12 archive holding the client key and
/// certificate. `trust_anchor` is the server's self-signed certificate in
/// PEM or DER form. Both are unlocked with the same password.
#[derive(Clone)]
pub struct Credentials {
    client_identity: Option<Vec<u8>>,
    trust_anchor: Option<Vec<u8>>,
    password: String,
}

/// Borrowed TLS material handed to a [`Transport`](super::Transport)
#[derive(Clone, Copy)]
pub struct PinnedTls<'a> {
    pub client_identity: &'a [u8],
    pub trust_anchor: &'a [u8],
    pub password: &'a str,
    pub hostname_policy: HostnamePolicy,
}

impl Credentials {
    pub fn new(
        client_identity: Option<Vec<u8>>,
        trust_anchor: Option<Vec<u8>>,
        password: impl Into<String>,
    ) -> Self {
        Credentials {
            client_identity,
            trust_anchor,
            password: password.into(),
        }
    }

    /// Credentials with neither asset present
    pub fn missing() -> Self {
        Credentials::new(None, None, String::new())
    }

    pub fn is_complete(&self) -> bool {
        self.client_identity.is_some() && self.trust_anchor.is_some()
    }

    pub(crate) fn pinned(
        &self,
        hostname_policy: HostnamePolicy,
    ) -> Result<PinnedTls<'_>, ChannelFailure> {
        match (&self.client_identity, &self.trust_anchor) {
            (Some(identity), Some(anchor)) => Ok(PinnedTls {
                client_identity: identity,
                trust_anchor: anchor,
                password: &self.password,
                hostname_policy,
            }),
            (None, None) => Err(ChannelFailure::MissingCredentials(
                "client keystore and trust anchor are both absent".to_string(),
            )),
            (None, Some(_)) => Err(ChannelFailure::MissingCredentials(
                "client keystore is absent".to_string(),
            )),
            (Some(_), None) => Err(ChannelFailure::MissingCredentials(
                "trust anchor is absent".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_identity", &self.client_identity.as_ref().map(Vec::len))
            .field("trust_anchor", &self.trust_anchor.as_ref().map(Vec::len))
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads credential assets from disk. Loaded fresh for every request.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    keystore_path: PathBuf,
    trust_anchor_path: PathBuf,
    password: String,
}

impl CredentialStore {
    pub fn new(
        keystore_path: impl Into<PathBuf>,
        trust_anchor_path: impl Into<PathBuf>,
        password: impl Into<String>,
    ) -> Self {
        CredentialStore {
            keystore_path: keystore_path.into(),
            trust_anchor_path: trust_anchor_path.into(),
            password: password.into(),
        }
    }

    /// Missing or unreadable files yield absent assets; the channel then
    /// refuses to connect.
    pub async fn load(&self) -> Credentials {
        let client_identity = read_asset(&self.keystore_path).await;
        let trust_anchor = read_asset(&self.trust_anchor_path).await;
        Credentials::new(client_identity, trust_anchor, self.password.clone())
    }
}

/// Where a caller obtains credentials before each request
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn load(&self) -> Credentials;
}

#[async_trait]
impl CredentialSource for CredentialStore {
    async fn load(&self) -> Credentials {
        CredentialStore::load(self).await
    }
}

/// Credentials already held in memory
#[async_trait]
impl CredentialSource for Credentials {
    async fn load(&self) -> Credentials {
        self.clone()
    }
}

async fn read_asset(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => {
            tracing::warn!("Credential asset {} is empty", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Credential asset {} unavailable: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assets_are_reported() {
        let none = Credentials::missing();
        assert!(!none.is_complete());
        assert!(matches!(
            none.pinned(HostnamePolicy::Strict),
            Err(ChannelFailure::MissingCredentials(_))
        ));

        let no_anchor = Credentials::new(Some(vec![1, 2, 3]), None, "pw");
        assert!(matches!(
            no_anchor.pinned(HostnamePolicy::Strict),
            Err(ChannelFailure::MissingCredentials(_))
        ));
    }

    #[test]
    fn complete_assets_are_borrowed() {
        let creds = Credentials::new(Some(vec![1, 2]), Some(vec![3]), "pw");
        let tls = creds.pinned(HostnamePolicy::Strict).unwrap();
        assert_eq!(tls.client_identity, &[1u8, 2][..]);
        assert_eq!(tls.trust_anchor, &[3u8][..]);
        assert_eq!(tls.password, "pw");
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new(Some(vec![0; 4]), None, "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn store_with_missing_files_loads_nothing() {
        let store = CredentialStore::new(
            "/nonexistent/client.p12",
            "/nonexistent/truststore.pem",
            "123456",
        );
        let creds = store.load().await;
        assert!(!creds.is_complete());
    }
}
