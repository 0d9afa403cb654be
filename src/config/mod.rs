use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub mod node;

/// Poll intervals in milliseconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub bestblockhash: u64,
    pub blockchaininfo: u64,
    pub networkinfo: u64,
    pub nettotals: u64,
    pub peerinfo: u64,
    pub mempoolinfo: u64,
    pub smartfee: u64,
    pub uptime: u64,
    pub walletinfo: u64,
    pub sinceblock: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            bestblockhash: 1_000,
            blockchaininfo: 5_000,
            networkinfo: 5_000,
            nettotals: 5_000,
            peerinfo: 5_000,
            mempoolinfo: 5_000,
            smartfee: 15_000,
            uptime: 5_000,
            walletinfo: 1_000,
            sinceblock: 5_000,
        }
    }
}

impl PollConfig {
    /// Interval for a millisecond setting; zero falls back to one second.
    pub fn interval(ms: u64) -> Duration {
        if ms == 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_millis(ms)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Node data directory holding `bitcoin.conf` and `.cookie`
    pub datadir: Option<PathBuf>,

    pub rpc_url: Option<String>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,

    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub poll: PollConfig,

    /// Confirmation targets for `estimatesmartfee`
    #[serde(default = "default_fee_targets")]
    pub fee_targets: Vec<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datadir: None,
            rpc_url: None,
            rpc_user: None,
            rpc_password: None,
            log_dir: None,
            poll: PollConfig::default(),
            fee_targets: default_fee_targets(),
        }
    }
}

fn default_fee_targets() -> Vec<u64> {
    vec![2, 6, 12]
}

impl Config {
    /// Log directory, falling back to the platform data directory
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir.clone().or_else(data_dir)
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content)
}

/// Parse a config file body. Unparsable input yields the defaults.
pub fn parse(content: &str) -> Config {
    toml::from_str::<Config>(content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CHAINPEEK_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("chainpeek").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("chainpeek").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "chainpeek", "chainpeek")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("chainpeek"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("chainpeek"));
    }
    directories::ProjectDirs::from("io", "chainpeek", "chainpeek")
        .map(|dirs| dirs.data_dir().to_path_buf())
}
