use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use pool_http::codec::DEFAULT_MAX_HEAD_BYTES;
use pool_http::pool::PoolConfig;

use crate::error::ServerError;

#[derive(Parser, Debug)]
#[command(name = "pool-http-server")]
#[command(version, about = "Serve HTTP/1.x over a fixed pool of workers", long_about = None)]
pub struct Cli {
    /// Where to listen: `tcp:<port>` or `uds:<path>`
    pub listen: Listen,

    /// Number of workers
    #[arg(short, long, default_value = "2")]
    pub workers: NonZeroUsize,

    /// Bound of the pending queue, unbounded when omitted
    #[arg(long)]
    pub max_pending: Option<usize>,

    /// Largest accepted request head, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_HEAD_BYTES)]
    pub max_head_bytes: usize,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::default()
            .workers(self.workers)
            .max_pending(self.max_pending)
            .max_head_bytes(self.max_head_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listen {
    Tcp(u16),
    Uds(PathBuf),
}

impl FromStr for Listen {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ServerError::InvalidListen(s.to_string());
        match s.split_once(':') {
            Some(("tcp", port)) => port.parse().map(Listen::Tcp).map_err(|_| invalid()),
            Some(("uds", path)) if !path.is_empty() => Ok(Listen::Uds(PathBuf::from(path))),
            _ => Err(invalid()),
        }
    }
}
