//! Arena configuration loaded from TOML.
//!
//! ```toml
//! primary_oracle = "k-NN"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [session]
//! automated_player = "O"
//! seed = 42
//!
//! [[oracles]]
//! name = "k-NN"
//! kind = "nearest_neighbor"
//! dataset = "train_dataset.csv"
//! k = 5
//!
//! [[oracles]]
//! name = "Rules"
//! kind = "rule"
//! ```

use crate::error::ConfigError;
use crate::oracle::{Oracle, OracleRegistry};
use crate::oracles::{ConstantOracle, NearestNeighborOracle, RandomOracle, RuleOracle};
use crate::session::SessionSettings;
use derive_getters::Getters;
use oracle_board::ProgressLabel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "ORACLE_ARENA_CONFIG";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which built-in adapter backs an oracle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OracleKind {
    /// [`RuleOracle`].
    Rule,
    /// [`RandomOracle`].
    Random {
        /// Optional seed for reproducible guesses.
        #[serde(default)]
        seed: Option<u64>,
    },
    /// [`NearestNeighborOracle`].
    NearestNeighbor {
        /// CSV dataset path, relative to the config file's directory.
        dataset: PathBuf,
        /// Neighbour count.
        #[serde(default = "default_k")]
        k: usize,
    },
    /// [`ConstantOracle`].
    Constant {
        /// Label returned for every board.
        label: ProgressLabel,
    },
}

fn default_k() -> usize {
    NearestNeighborOracle::DEFAULT_K
}

/// One `[[oracles]]` entry.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct OracleSpec {
    /// Display name, unique within the registry.
    name: String,

    /// Adapter and its parameters.
    #[serde(flatten)]
    kind: OracleKind,
}

impl OracleSpec {
    /// Creates an oracle entry.
    pub fn new(name: impl Into<String>, kind: OracleKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Instantiates the adapter. Relative dataset paths resolve against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a dataset cannot be loaded.
    #[instrument(skip(self, base), fields(oracle = %self.name))]
    pub fn build(&self, base: &Path) -> Result<Box<dyn Oracle>, ConfigError> {
        debug!(kind = ?self.kind, "Building oracle");
        let oracle: Box<dyn Oracle> = match &self.kind {
            OracleKind::Rule => Box::new(RuleOracle),
            OracleKind::Random { seed } => Box::new(RandomOracle::new(*seed)),
            OracleKind::NearestNeighbor { dataset, k } => {
                Box::new(NearestNeighborOracle::from_csv(base.join(dataset), *k)?)
            }
            OracleKind::Constant { label } => Box::new(ConstantOracle::new(*label)),
        };
        Ok(oracle)
    }
}

fn default_oracles() -> Vec<OracleSpec> {
    vec![
        OracleSpec::new("Rules", OracleKind::Rule),
        OracleSpec::new("Random Guess", OracleKind::Random { seed: None }),
        OracleSpec::new(
            "Always Ongoing",
            OracleKind::Constant {
                label: ProgressLabel::Ongoing,
            },
        ),
    ]
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// HTTP listener.
    #[serde(default)]
    server: ServerConfig,

    /// Settings shared by every session.
    #[serde(default)]
    session: SessionSettings,

    /// Name of the oracle highlighted in snapshots. Defaults to the first.
    #[serde(default)]
    primary_oracle: Option<String>,

    /// Oracles in display order.
    #[serde(default = "default_oracles")]
    oracles: Vec<OracleSpec>,

    /// Directory relative dataset paths resolve against.
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionSettings::default(),
            primary_oracle: None,
            oracles: default_oracles(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl ArenaConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not a valid config.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.base_dir = PathBuf::from(".");
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        info!(oracles = config.oracles.len(), "Config loaded successfully");
        Ok(config)
    }

    /// Loads from `path`, else from `$ORACLE_ARENA_CONFIG`, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a named file cannot be read or parsed.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match std::env::var_os(CONFIG_ENV_VAR) {
                Some(path) => Self::from_file(PathBuf::from(path)),
                None => {
                    info!("No config file given, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Overrides the listener address.
    pub fn with_server(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }

    /// Overrides the automated player's seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.session.seed = seed;
        }
        self
    }

    /// Builds the oracle registry described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an adapter fails to load, names repeat,
    /// or the primary oracle is unknown.
    #[instrument(skip(self), fields(count = self.oracles.len()))]
    pub fn build_registry(&self) -> Result<OracleRegistry, ConfigError> {
        let mut builder = OracleRegistry::builder();
        for spec in &self.oracles {
            builder = builder.register_boxed(spec.name.clone(), spec.build(&self.base_dir)?);
        }
        if let Some(primary) = &self.primary_oracle {
            builder = builder.primary(primary.clone());
        }
        let registry = builder.build()?;
        info!(
            names = ?registry.names().collect::<Vec<_>>(),
            primary = ?registry.primary(),
            "Oracle registry ready"
        );
        Ok(registry)
    }
}
