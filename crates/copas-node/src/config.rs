use copas_core::model::node::NodeId;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_SCORE_LIMIT: u16 = 100;
const DEFAULT_START_GRACE_MS: u64 = 1_000;

/// Ring configuration loaded from YAML: the four peer endpoints in ring
/// order plus game and logging knobs. Every node reads the same file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RingConfig {
    pub peers: Vec<PeerEndpoint>,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PeerEndpoint {
    pub host: String,
    pub port: u16,
}

impl PeerEndpoint {
    pub fn resolve(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::Unresolvable {
                host: self.host.clone(),
                port: self.port,
            })
    }
}

/// Game pacing and termination knobs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Shuffle seed; omitted means a fresh random seed at the coordinator.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Cumulative score that ends the game.
    #[serde(default = "default_score_limit")]
    pub score_limit: u16,
    /// How long the coordinator waits before GAME_START so the other
    /// three processes can bind their sockets.
    #[serde(default = "default_start_grace_ms")]
    pub start_grace_ms: u64,
    /// Optional pause before each token release, to make console output
    /// followable on a live ring.
    #[serde(default)]
    pub pace_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            score_limit: DEFAULT_SCORE_LIMIT,
            start_grace_ms: DEFAULT_START_GRACE_MS,
            pace_ms: 0,
        }
    }
}

/// Logging defaults to `info`; `RUST_LOG` overrides at runtime.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_score_limit() -> u16 {
    DEFAULT_SCORE_LIMIT
}

fn default_start_grace_ms() -> u64 {
    DEFAULT_START_GRACE_MS
}

fn default_tracing_level() -> String {
    "info".to_string()
}

impl RingConfig {
    /// Load and validate a ring file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let cfg: RingConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate without performing I/O.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.peers.len() != 4 {
            return Err(ValidationError::InvalidField {
                field: "peers".to_string(),
                message: format!("the ring needs exactly 4 peers, found {}", self.peers.len()),
            });
        }

        let mut seen = HashSet::new();
        for (index, peer) in self.peers.iter().enumerate() {
            if peer.host.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: format!("peers[{index}].host"),
                    message: "host must not be empty".to_string(),
                });
            }
            if !seen.insert((peer.host.clone(), peer.port)) {
                return Err(ValidationError::InvalidField {
                    field: format!("peers[{index}]"),
                    message: format!("endpoint {}:{} appears twice", peer.host, peer.port),
                });
            }
        }

        if self.game.score_limit == 0 {
            return Err(ValidationError::InvalidField {
                field: "game.score_limit".to_string(),
                message: "score limit must be greater than zero".to_string(),
            });
        }

        if self.logging.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!("unknown level '{}'", self.logging.tracing_level),
            });
        }

        Ok(())
    }

    pub fn endpoint(&self, node: NodeId) -> &PeerEndpoint {
        &self.peers[node.index()]
    }

    /// Where `node` listens.
    pub fn listen_addr(&self, node: NodeId) -> Result<SocketAddr, ConfigError> {
        // Bind on all interfaces at the configured port; the host column is
        // what the predecessor dials.
        let port = self.peers[node.index()].port;
        Ok(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    /// Where `node` forwards: its ring successor.
    pub fn successor_addr(&self, node: NodeId) -> Result<SocketAddr, ConfigError> {
        self.endpoint(node.successor()).resolve()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read ring file {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse ring file {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid ring file {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
    #[error("cannot resolve {host}:{port}")]
    Unresolvable { host: String, port: u16 },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
