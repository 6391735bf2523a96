//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_BACKLOG: u32 = 100;
pub const DEFAULT_BUFFER_SIZE: usize = 1024;
pub const DEFAULT_INDEX: &str = "index.html";

/// Minimal pre-threaded HTTP/1.1 static file server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root directory for reading files
    #[arg(short, long, env = "DOCUMENT_ROOT")]
    pub root: PathBuf,

    /// Number of worker threads
    #[arg(short = 'c', long = "ncpu", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Address to listen on
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Listen backlog
    #[arg(long, default_value_t = DEFAULT_BACKLOG)]
    pub backlog: u32,

    /// Bytes read from each connection; longer requests are truncated
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Document served for directory requests
    #[arg(long, default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Log level (error, warn, info, debug, trace, off)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Everything the listener and handler need, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub backlog: u32,
    pub buffer_size: usize,
    pub index: String,
}

impl ServerConfig {
    /// Config serving `root` with every other setting at its default.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ServerConfig {
            root: root.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            backlog: DEFAULT_BACKLOG,
            buffer_size: DEFAULT_BUFFER_SIZE,
            index: DEFAULT_INDEX.to_string(),
        }
    }

    /// `host:port` for display, with IPv6 literals bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Checks the settings and replaces `root` with its canonical form.
    pub fn validate(mut self) -> Result<Self> {
        if self.workers == 0 {
            return Err(Error::Config("worker count must be at least 1".into()));
        }
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer size must be at least 1".into()));
        }
        if self.index.is_empty() || self.index.contains('/') {
            return Err(Error::Config(format!(
                "index document must be a plain file name, got {:?}",
                self.index
            )));
        }

        let root = self.root.canonicalize().map_err(|source| Error::InvalidRoot {
            path: self.root.clone(),
            source,
        })?;
        if !root.is_dir() {
            return Err(Error::RootNotDirectory(root));
        }
        self.root = root;

        Ok(self)
    }
}

impl Args {
    pub fn into_config(self) -> Result<ServerConfig> {
        ServerConfig {
            root: self.root,
            host: self.host,
            port: self.port,
            workers: self.workers,
            backlog: self.backlog,
            buffer_size: self.buffer_size,
            index: self.index,
        }
        .validate()
    }
}
