use crate::constants::*;
use crate::models::Tolerance;
use crate::services::secure_channel::{BackendEndpoint, CredentialStore, HostnamePolicy};
use crate::services::tracking::LastValidPolicy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_host: String,
    pub backend_port: u16,
    pub client_keystore_path: PathBuf,
    pub trust_anchor_path: PathBuf,
    pub keystore_password: String,
    pub hostname_policy: HostnamePolicy,
    /// `None` leaves the transport's default timeouts in place
    pub request_timeout: Option<Duration>,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Max distance (meters) from entrance, exit or corridor to count as on-path
    pub proximity_tolerance_m: f64,

    /// Max displacement (meters) from the last valid position before the
    /// player is told to return
    pub drift_tolerance_m: f64,

    /// Whether the drift reference follows the player or stays at the entrance
    pub last_valid_policy: LastValidPolicy,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            proximity_tolerance_m: DEFAULT_PROXIMITY_TOLERANCE_M,
            drift_tolerance_m: DEFAULT_DRIFT_TOLERANCE_M,
            last_valid_policy: LastValidPolicy::default(),
        }
    }
}

impl TrackingConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            proximity_tolerance_m: env::var("MAZE_PROXIMITY_TOLERANCE_M")
                .unwrap_or_else(|_| defaults.proximity_tolerance_m.to_string())
                .parse()
                .map_err(|_| "Invalid MAZE_PROXIMITY_TOLERANCE_M")?,

            drift_tolerance_m: env::var("MAZE_DRIFT_TOLERANCE_M")
                .unwrap_or_else(|_| defaults.drift_tolerance_m.to_string())
                .parse()
                .map_err(|_| "Invalid MAZE_DRIFT_TOLERANCE_M")?,

            last_valid_policy: env::var("MAZE_LAST_VALID_POLICY")
                .unwrap_or_else(|_| "pinned".to_string())
                .parse()?,
        };

        // Validate radii up front
        config.tolerance()?;
        Ok(config)
    }

    pub fn tolerance(&self) -> Result<Tolerance, String> {
        Tolerance::new(self.proximity_tolerance_m, self.drift_tolerance_m)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let request_timeout = match env::var("MAZE_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| "Invalid MAZE_REQUEST_TIMEOUT_SECS")?;
                if secs == 0 {
                    return Err("MAZE_REQUEST_TIMEOUT_SECS must be greater than 0".to_string());
                }
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Config {
            backend_host: env::var("MAZE_BACKEND_HOST")
                .unwrap_or_else(|_| DEFAULT_BACKEND_HOST.to_string()),
            backend_port: env::var("MAZE_BACKEND_PORT")
                .unwrap_or_else(|_| DEFAULT_BACKEND_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid MAZE_BACKEND_PORT")?,
            client_keystore_path: env::var("MAZE_CLIENT_KEYSTORE")
                .unwrap_or_else(|_| DEFAULT_CLIENT_KEYSTORE_PATH.to_string())
                .into(),
            trust_anchor_path: env::var("MAZE_TRUST_ANCHOR")
                .unwrap_or_else(|_| DEFAULT_TRUST_ANCHOR_PATH.to_string())
                .into(),
            keystore_password: env::var("MAZE_KEYSTORE_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_KEYSTORE_PASSWORD.to_string()),
            hostname_policy: env::var("MAZE_HOSTNAME_POLICY")
                .unwrap_or_else(|_| "strict".to_string())
                .parse()?,
            request_timeout,
            tracking: TrackingConfig::from_env()?,
        })
    }

    pub fn endpoint(&self) -> Result<BackendEndpoint, String> {
        BackendEndpoint::new(self.backend_host.clone(), self.backend_port)
            .map_err(|e| e.to_string())
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(
            self.client_keystore_path.clone(),
            self.trust_anchor_path.clone(),
            self.keystore_password.clone(),
        )
    }
}
