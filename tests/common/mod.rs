use async_trait::async_trait;
use mazewalk::config::{Config, TrackingConfig};
use mazewalk::models::{MazeDefinition, PathSegment, Position};
use mazewalk::services::secure_channel::{
    BackendEndpoint, ChannelFailure, ChannelResponse, Credentials, HostnamePolicy, Method,
    PinnedTls, SecureChannel, Transport,
};
use reqwest::Url;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FEUP_ENTRANCE: (f64, f64) = (41.17825551202372, -8.598213940858841);
pub const FEUP_EXIT: (f64, f64) = (41.17767384142088, -8.595726862549782);

/// Corridors of the FEUP campus maze as encoded polylines
pub const FEUP_CORRIDORS: [&str; 6] = [
    "itizFlins@B???????@?????@@??????@?????????@??????@??@???????@??????@@???????????@??@????@???????@??@????@?????@@????@???????@??????@??@?????????@??@??????@?????????@?A@@???????@????@??@???????@?????@???@@????@?????@????@??@?????????@?????????@@????@?????@@????@???????@??@??????@???",
    "}sizFpins@AC???A???A???????A???????A?????A???????A???A???A?????A???????A?????A@A???A?????A?????A?A???A???A????@??A???????A??????@?????????@??A?????A?????A??",
    "orizF|ins@BE?A???A?A???A?A@A?A@A?ABC?A@EBC@C@C@E@C@E@E?C@C?A?A@??A???A@??A?C?A@A?C?A?A???A@????A@M?C?C?C?A?A@??A???A??@??A???A?A",
    "aqizFhens@AG?A?C?A?E?C?E@E?E?E@C?C@E?C?A??@A???A???A??@A???A???A????@A???A?A@A???A?A???A?A?A@A???A?A???A?A?A??@A?A???A??@A?A?A???A?A??@A?A???A???A???A???A???A???A???A???A?A???A?A?A?????A???A???A?A???A@????A???A",
    "kpizF~_ns@?G?A???A???A?A?A?A???C??@A???A?A?A???A??@A?A???A???A???A?A???A?A???A@A???A???C?A???A@I?A?A@A?A?A?A?A?A???A?A@A?A???A???A???A@A???A?A???A?A?A@A?A?A???C???A@??A???A?A???A@C?A?C?C?C@E?A?A???A@??A?????A@??A???A?A@??A???A@A?A",
    "irizFdjns@AE?A???A???A???A?A???A???A???A",
];

#[allow(dead_code)]
pub fn position(lat: f64, lng: f64) -> Position {
    Position::new(lat, lng).unwrap()
}

/// The campus maze used for manual play-testing
#[allow(dead_code)]
pub fn feup_maze() -> MazeDefinition {
    let corridors = FEUP_CORRIDORS
        .iter()
        .map(|encoded| PathSegment::from_encoded(encoded, false).unwrap())
        .collect();
    MazeDefinition::new(
        "feup",
        position(FEUP_ENTRANCE.0, FEUP_ENTRANCE.1),
        position(FEUP_EXIT.0, FEUP_EXIT.1),
        corridors,
    )
    .unwrap()
}

/// Single straight corridor running ~170 m east from the entrance
#[allow(dead_code)]
pub fn straight_maze() -> MazeDefinition {
    let entrance = position(41.0, -8.0);
    let exit = position(41.0, -7.998);
    let corridor = PathSegment::new(vec![entrance, exit], false).unwrap();
    MazeDefinition::new("straight", entrance, exit, vec![corridor]).unwrap()
}

/// Get test configuration
#[allow(dead_code)]
pub fn get_test_config() -> Config {
    Config {
        backend_host: std::env::var("MAZE_BACKEND_HOST")
            .unwrap_or_else(|_| "172.30.2.216".to_string()),
        backend_port: 8000,
        client_keystore_path: "assets/client.p12".into(),
        trust_anchor_path: "assets/truststore.pem".into(),
        keystore_password: "123456".to_string(),
        hostname_policy: HostnamePolicy::AcceptAnyForPinnedHost,
        request_timeout: Some(Duration::from_secs(10)),
        tracking: TrackingConfig::default(),
    }
}

/// Live backend tests only run when MAZE_LIVE_BACKEND is set
#[allow(dead_code)]
pub fn should_skip_live_backend_tests() -> bool {
    std::env::var("MAZE_LIVE_BACKEND").is_err()
}

/// Placeholder TLS material; the mock transport never parses it
#[allow(dead_code)]
pub fn dummy_credentials() -> Credentials {
    Credentials::new(
        Some(vec![0x30, 0x82, 0x01]),
        Some(b"-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----\n".to_vec()),
        "123456",
    )
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedExchange {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

#[allow(dead_code)]
pub enum Reply {
    Respond(ChannelResponse),
    Fail(String),
}

/// In-memory transport: records every exchange and answers with a fixed reply
#[allow(dead_code)]
pub struct MockTransport {
    reply: Reply,
    delay: Duration,
    attempts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    recorded: Mutex<Vec<RecordedExchange>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new(reply: Reply) -> Self {
        MockTransport {
            reply,
            delay: Duration::ZERO,
            attempts: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(status: u16, body: &str) -> Self {
        Self::new(Reply::Respond(ChannelResponse {
            status,
            body: Some(body.to_string()),
        }))
    }

    /// Hold each exchange open for `delay` so overlaps become observable
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedExchange> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn exchange(
        &self,
        url: &Url,
        method: &Method,
        _tls: &PinnedTls<'_>,
    ) -> Result<ChannelResponse, ChannelFailure> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.recorded.lock().unwrap().push(RecordedExchange {
            method: method.as_str(),
            url: url.to_string(),
            body: method.body().map(str::to_string),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(ChannelFailure::Transport(message.clone())),
        }
    }
}

#[allow(dead_code)]
pub fn mock_channel(transport: MockTransport) -> Arc<SecureChannel<MockTransport>> {
    Arc::new(SecureChannel::with_transport(
        BackendEndpoint::new("172.30.2.216", 8000).unwrap(),
        HostnamePolicy::Strict,
        transport,
    ))
}
