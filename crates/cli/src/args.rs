use bcached_cache::EmptyExpectation;
use bcached_server::ConfigLayer;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "bcached")]
#[command(about = "Key-value cache with compare-and-swap puts and file persistence", long_about = None)]
#[command(version, disable_version_flag = true)]
pub struct Args {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding one record file per key
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Interface to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// JSON config file (defaults to $BCACHED_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Give up on a request after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub request_timeout_ms: Option<u64>,

    /// Number of arbitrator workers
    #[arg(long)]
    pub shards: Option<usize>,

    /// Queued commands per worker before callers wait
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// How a put with an empty FromValue is treated
    #[arg(long, value_enum)]
    pub empty_expectation: Option<EmptyExpectationArg>,

    /// Log every request (same as --log-level debug)
    #[arg(long)]
    pub debug: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: Level,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmptyExpectationArg {
    /// Empty FromValue matches anything
    Unconditional,
    /// Empty FromValue only matches a key that was never written
    RequireAbsent,
}

impl From<EmptyExpectationArg> for EmptyExpectation {
    fn from(arg: EmptyExpectationArg) -> Self {
        match arg {
            EmptyExpectationArg::Unconditional => EmptyExpectation::Unconditional,
            EmptyExpectationArg::RequireAbsent => EmptyExpectation::RequireAbsent,
        }
    }
}

impl Args {
    pub fn level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else {
            self.log_level
        }
    }

    /// Flags given on the command line, as the highest config layer
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            host: self.host.clone(),
            port: self.port,
            data_dir: self.data_dir.clone(),
            request_timeout_ms: self.request_timeout_ms,
            shards: self.shards,
            queue_depth: self.queue_depth,
            empty_expectation: self.empty_expectation.map(Into::into),
        }
    }
}
