//! Node endpoint and credential discovery from a `bitcoin.conf` data directory

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::infrastructure::rpc::RpcAuth;

pub const CONF_FILE: &str = "bitcoin.conf";
pub const COOKIE_FILE: &str = ".cookie";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no .cookie in {} and no bitcoin.conf to fall back on", datadir.display())]
    NoConfig { datadir: PathBuf },

    #[error("{} has no rpcuser/rpcpassword and no .cookie was found", path.display())]
    NoCredentials { path: PathBuf },
}

/// Which chain the node is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Main,
    Testnet,
    Regtest,
}

impl Network {
    pub fn default_port(self) -> u16 {
        match self {
            Network::Main => 8332,
            Network::Testnet => 18332,
            Network::Regtest => 18443,
        }
    }

    /// Subdirectory of the datadir holding this network's cookie
    pub fn subdir(self) -> Option<&'static str> {
        match self {
            Network::Main => None,
            Network::Testnet => Some("testnet3"),
            Network::Regtest => Some("regtest"),
        }
    }
}

/// Parsed `bitcoin.conf` key/value pairs
#[derive(Debug, Clone, Default)]
pub struct NodeConf {
    values: HashMap<String, String>,
}

impl NodeConf {
    /// Parse `key=value` lines. Comments, blank lines and lines without `=`
    /// are skipped; the last occurrence of a key wins.
    pub fn parse(content: &str) -> Self {
        let values = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        Self { values }
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        fs::read_to_string(path).map(|content| Self::parse(&content))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    pub fn network(&self) -> Network {
        if self.flag("regtest") {
            Network::Regtest
        } else if self.flag("testnet") {
            Network::Testnet
        } else {
            Network::Main
        }
    }

    pub fn url(&self) -> String {
        let protocol = self.get("protocol").unwrap_or("http");
        let host = self.get("rpcconnect").unwrap_or("localhost");
        let port = self
            .get("rpcport")
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or_else(|| self.network().default_port());
        format!("{protocol}://{host}:{port}")
    }

    pub fn credentials(&self) -> Option<RpcAuth> {
        Some(RpcAuth::UserPass {
            user: self.get("rpcuser")?.to_string(),
            password: self.get("rpcpassword")?.to_string(),
        })
    }
}

/// Default data directory, `~/.bitcoin`
pub fn default_datadir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".bitcoin")
}

/// Node URL for a datadir. A missing `bitcoin.conf` means mainnet defaults.
pub fn discover_url(datadir: &Path) -> String {
    NodeConf::read(&datadir.join(CONF_FILE))
        .unwrap_or_default()
        .url()
}

/// Credentials for a datadir: the network's cookie file first, then the
/// datadir cookie, then `rpcuser`/`rpcpassword`.
pub fn discover_auth(datadir: &Path) -> Result<RpcAuth, DiscoveryError> {
    let conf_path = datadir.join(CONF_FILE);
    let conf = NodeConf::read(&conf_path).ok();
    let network = conf.as_ref().map(NodeConf::network).unwrap_or(Network::Main);

    let cookie_paths = network
        .subdir()
        .map(|sub| datadir.join(sub).join(COOKIE_FILE))
        .into_iter()
        .chain(std::iter::once(datadir.join(COOKIE_FILE)));
    for path in cookie_paths {
        if let Some(line) = read_cookie(&path) {
            tracing::info!(path = %path.display(), "using cookie authentication");
            return Ok(RpcAuth::Cookie(line));
        }
    }

    let conf = conf.ok_or_else(|| DiscoveryError::NoConfig {
        datadir: datadir.to_path_buf(),
    })?;
    tracing::info!(path = %conf_path.display(), "no cookie, using rpcuser/rpcpassword");
    conf.credentials()
        .ok_or(DiscoveryError::NoCredentials { path: conf_path })
}

fn read_cookie(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let line = content.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}
