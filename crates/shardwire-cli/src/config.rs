//! Proxy-facing configuration, loaded from a TOML file.
//!
//! Covers only the knobs the parser's (out-of-scope) callers need: where to
//! listen, which shard endpoints exist, and how large a single frame may
//! grow before the codec rejects it. Hashing policy and backend health live
//! outside this crate entirely.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use shardwire_core::constants::DEFAULT_MAX_FRAME_SIZE;
use shardwire_core::{Error, Result};

/// Top-level configuration for the proxy binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Address the proxy listens on for client connections.
    pub listen_addr: String,

    /// Addresses of the Redis shards requests may be routed to.
    pub shards: Vec<String>,

    /// Bytes a single request/response frame may occupy before the codec
    /// rejects it with [`shardwire_core::Error::FrameTooLarge`].
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

impl ProxyConfig {
    /// Load and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Validate that the config names at least one shard.
    ///
    /// `load` only checks the TOML is well-formed; this catches the
    /// configuration mistakes that are still syntactically valid.
    pub fn validate(&self) -> Result<()> {
        if self.shards.is_empty() {
            return Err(Error::MissingConfig("shards".to_string()));
        }
        Ok(())
    }
}
