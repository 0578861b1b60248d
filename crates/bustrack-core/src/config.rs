use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024; // 16 KB hard cap per frame
pub const BROADCAST_QUEUE_CAPACITY: usize = 256; // per-recipient outbound queue

/// Top-level config (bustrack.toml + BUSTRACK_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusTrackConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    /// The fleet. Loaded once at startup and never mutated afterwards.
    #[serde(default = "default_publishers")]
    pub publishers: Vec<PublisherConfig>,
}

impl Default for BusTrackConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            broadcast: BroadcastConfig::default(),
            publishers: default_publishers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Events queued per connection before new ones are dropped for it.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            queue_capacity: BROADCAST_QUEUE_CAPACITY,
        }
    }
}

/// One registered bus and the shared secret its driver client presents.
#[derive(Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    pub id: String,
    pub name: String,
    pub route: String,
    pub color: String,
    pub token: String,
}

impl PublisherConfig {
    pub fn new(id: &str, name: &str, route: &str, color: &str, token: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            route: route.to_string(),
            color: color.to_string(),
            token: token.to_string(),
        }
    }
}

// Tokens must never reach the logs, so Debug is written by hand.
impl fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("route", &self.route)
            .field("color", &self.color)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_queue_capacity() -> usize {
    BROADCAST_QUEUE_CAPACITY
}

/// The BRUR fleet as originally deployed.
pub fn default_publishers() -> Vec<PublisherConfig> {
    vec![
        PublisherConfig::new(
            "BUS-01",
            "Bus 1",
            "BRUR → Modern More → Station",
            "#e74c3c",
            "TOKEN-BUS01-SECRET",
        ),
        PublisherConfig::new(
            "BUS-02",
            "Bus 2",
            "BRUR → Medical → Shapla Chattar",
            "#3498db",
            "TOKEN-BUS02-SECRET",
        ),
        PublisherConfig::new(
            "BUS-03",
            "Bus 3",
            "BRUR → Lalbagh → Dhap",
            "#2ecc71",
            "TOKEN-BUS03-SECRET",
        ),
        PublisherConfig::new(
            "BUS-04",
            "Bus 4",
            "BRUR → Cantonment → Mahiganj",
            "#f39c12",
            "TOKEN-BUS04-SECRET",
        ),
        PublisherConfig::new(
            "BUS-05",
            "Bus 5",
            "BRUR → Cadet College Road",
            "#9b59b6",
            "TOKEN-BUS05-SECRET",
        ),
    ]
}

impl BusTrackConfig {
    /// Load config from a TOML file with env var overrides.
    ///
    /// Precedence, lowest first:
    ///   1. built-in defaults
    ///   2. the TOML file (explicit path, else ~/.bustrack/bustrack.toml)
    ///   3. BUSTRACK_* variables, double underscore between section and key:
    ///      `BUSTRACK_GATEWAY__PORT=8080`, `BUSTRACK_BROADCAST__QUEUE_CAPACITY=64`
    ///   4. PORT, the conventional hosting-platform override
    ///
    /// Only an absent default file falls back to the built-in fleet. A file
    /// that exists but does not parse is an error, as is an explicit path
    /// that does not exist.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(crate::error::BusTrackError::Config(format!(
                    "config file not found: {}",
                    path
                )));
            }
        }
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(Self::figment(&path))
    }

    /// The layered figment for `path`, before extraction.
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(BusTrackConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("BUSTRACK_").split("__"))
            .merge(Env::raw().only(&["PORT"]).map(|_| "gateway.port".into()))
    }

    /// Extract from an already-assembled figment.
    pub fn from_figment(figment: Figment) -> crate::error::Result<Self> {
        figment
            .extract()
            .map_err(|e| crate::error::BusTrackError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.bustrack/bustrack.toml", home)
}
