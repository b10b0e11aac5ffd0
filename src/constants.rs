//! Stable application-wide constants.
//!
//! Values here are default fallbacks for env-var-based configuration and
//! fixed protocol parameters. For per-session tuning see
//! [`Tolerance`](crate::models::Tolerance) and [`Config`](crate::config::Config).

// --- Backend defaults (used when MAZE_BACKEND_HOST / MAZE_BACKEND_PORT are absent) ---

/// Default backend host. The maze server runs on a fixed address.
pub const DEFAULT_BACKEND_HOST: &str = "172.30.2.216";
/// Default backend port.
pub const DEFAULT_BACKEND_PORT: &str = "8000";

// --- Credential assets ---

/// Default path of the PKCS#12 client keystore (private key + certificate).
pub const DEFAULT_CLIENT_KEYSTORE_PATH: &str = "assets/client.p12";
/// Default path of the pinned trust anchor (server's self-signed certificate).
pub const DEFAULT_TRUST_ANCHOR_PATH: &str = "assets/truststore.pem";
/// Build-time password shared by both credential assets.
/// Overridden by `MAZE_KEYSTORE_PASSWORD`.
pub const DEFAULT_KEYSTORE_PASSWORD: &str = "123456";

// --- Geofencing tolerances (meters) ---

/// Max distance from entrance, exit or any corridor to count as on the maze.
/// Overridden by `MAZE_PROXIMITY_TOLERANCE_M`.
pub const DEFAULT_PROXIMITY_TOLERANCE_M: f64 = 3.5;
/// Max displacement from the last valid position before the player is told
/// to return. Overridden by `MAZE_DRIFT_TOLERANCE_M`.
pub const DEFAULT_DRIFT_TOLERANCE_M: f64 = 20.0;

/// Mean Earth radius used by every spherical computation.
pub const EARTH_RADIUS_M: f64 = 6_371_009.0;

// --- Location subscription parameters ---

/// Requested interval between position samples.
pub const LOCATION_REQUEST_INTERVAL_MS: u64 = 5_000;
/// Fastest interval the location provider may deliver samples at.
pub const LOCATION_REQUEST_FASTEST_INTERVAL_MS: u64 = 5_000;

// --- Backend protocol ---

/// Separator between status code and body in the textual response encoding.
pub const RESPONSE_SEPARATOR: &str = " - ";
/// Path suffix for maze lookups (`maps?name=<name>`).
pub const MAZE_LOOKUP_PATH: &str = "maps";
/// Path suffix for play result submission.
pub const RESULT_SUBMIT_PATH: &str = "results";

// --- User-facing notices ---

pub const RETURN_TO_PATH_NOTICE: &str = "Please return to your previous location";
pub const LOCATION_UNAVAILABLE_NOTICE: &str =
    "Can't use location services. Impossible to play a maze";
