//! The process's configuration surface (spec §6): a `clap` entry point for
//! the command line, layered over an optional `toml` file, producing the
//! single [`Config`] value every other component borrows from.
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::net::Connector;

/// CRC repair budget: how many bit errors the decoder is allowed to flip
/// before giving up on a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrcFixBudget {
    None,
    #[default]
    Single,
    Aggressive,
}

impl FromStr for CrcFixBudget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "none" => Ok(CrcFixBudget::None),
            "1" | "single" => Ok(CrcFixBudget::Single),
            "2" | "aggressive" => Ok(CrcFixBudget::Aggressive),
            other => Err(format!("unknown CRC fix budget: {other}")),
        }
    }
}

impl CrcFixBudget {
    pub fn nfix_crc(self) -> u8 {
        match self {
            CrcFixBudget::None => 0,
            CrcFixBudget::Single => 1,
            CrcFixBudget::Aggressive => 2,
        }
    }
}

/// Command-line options, parsed by `clap` derive, then folded together
/// with an optional config file to produce a [`Config`].
#[derive(Debug, Parser)]
#[command(
    name = "squitterd",
    version,
    author,
    about = "Decode and fan out Mode S / ADS-B / TIS-B traffic"
)]
pub struct Options {
    /// Path to a TOML configuration file, merged underneath these flags.
    #[arg(short, long, default_value = None)]
    pub config: Option<PathBuf>,

    /// Receiver latitude, used to resolve local CPR positions.
    #[arg(long, default_value = None)]
    pub lat: Option<f64>,

    /// Receiver longitude, used to resolve local CPR positions.
    #[arg(long, default_value = None)]
    pub lon: Option<f64>,

    /// Maximum plausible range from the receiver, in metres.
    #[arg(long, default_value = None)]
    pub max_range: Option<f64>,

    /// CRC bit-error repair budget: none, single or aggressive.
    #[arg(long, default_value = "single")]
    pub crc_fix: CrcFixBudget,

    /// Enable the optional Mode-A/C second demodulation pass.
    #[arg(long, default_value = "false")]
    pub modeac: bool,

    /// Reliability threshold for publishing a position, -1..4.
    #[arg(long, default_value = "2")]
    pub reliability: i8,

    /// List of upstream connectors, `host:port[,protocol]`.
    pub sources: Vec<Connector>,

    /// Local bind address for outbound fan-out listeners.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind_address: IpAddr,

    /// Beast output ports.
    #[arg(long = "beast-port", value_delimiter = ',')]
    pub beast_ports: Vec<u16>,

    /// Raw hex output ports.
    #[arg(long = "raw-port", value_delimiter = ',')]
    pub raw_ports: Vec<u16>,

    /// SBS (BaseStation) output ports.
    #[arg(long = "sbs-port", value_delimiter = ',')]
    pub sbs_ports: Vec<u16>,

    /// Per-session write coalescing threshold, in bytes.
    #[arg(long, default_value = "1280")]
    pub flush_size: usize,

    /// Per-session write coalescing interval, in milliseconds.
    #[arg(long, default_value = "50")]
    pub flush_interval_ms: u64,

    /// Keepalive interval for otherwise-idle sessions, in milliseconds.
    #[arg(long, default_value = "15000")]
    pub heartbeat_interval_ms: u64,

    /// Directory periodic VRS-JSON snapshots (aircraft.json et al.) are
    /// written to.
    #[arg(long, default_value = None)]
    pub json_dir: Option<PathBuf>,

    /// Directory globe tiles are written to.
    #[arg(long, default_value = None)]
    pub globe_history_dir: Option<PathBuf>,

    /// `aircraft.json`/`stats.json`/globe-shard write interval, in
    /// milliseconds.
    #[arg(long, default_value = "1000")]
    pub json_interval_ms: u64,

    /// Per-aircraft trace write interval, in seconds.
    #[arg(long, default_value = "30")]
    pub trace_interval_s: u64,

    /// Enable heatmap snapshots.
    #[arg(long, default_value = "false")]
    pub heatmap: bool,

    /// Heatmap snapshot interval, in seconds.
    #[arg(long, default_value = "60")]
    pub heatmap_interval_s: u64,

    /// Directory heatmap snapshots are written to.
    #[arg(long, default_value = None)]
    pub heatmap_dir: Option<PathBuf>,

    /// Directory `internal_state` is persisted to and reloaded from.
    #[arg(long, default_value = None)]
    pub state_dir: Option<PathBuf>,

    /// Path to a receiver UUID file, created on first run if absent.
    #[arg(long, default_value = None)]
    pub uuid_file: Option<PathBuf>,

    /// How many messages of history to keep per aircraft.
    #[arg(long, default_value = "50")]
    pub history_depth: usize,

    /// Per-session message deduplication window, in milliseconds.
    #[arg(long, default_value = "500")]
    pub dedup_interval_ms: u64,

    /// Debug flags, e.g. `dDcC` — diagnostic only, never load-bearing.
    #[arg(long, default_value = "")]
    pub debug_flags: String,
}

/// The fully resolved configuration every component borrows from, built by
/// merging a config file (if given) underneath command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_range: Option<f64>,
    pub crc_fix: CrcFixBudget,
    pub modeac: bool,
    pub reliability: i8,
    pub bind_address: IpAddr,
    pub beast_ports: Vec<u16>,
    pub raw_ports: Vec<u16>,
    pub sbs_ports: Vec<u16>,
    pub flush_size: usize,
    pub flush_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub json_dir: PathBuf,
    pub globe_history_dir: PathBuf,
    pub json_interval_ms: u64,
    pub trace_interval_s: u64,
    pub heatmap: bool,
    pub heatmap_interval_s: u64,
    pub heatmap_dir: PathBuf,
    pub state_dir: PathBuf,
    pub uuid_file: PathBuf,
    pub history_depth: usize,
    pub dedup_interval_ms: u64,
    pub debug_flags: String,
}

impl From<Options> for Config {
    fn from(options: Options) -> Config {
        Config {
            lat: options.lat,
            lon: options.lon,
            max_range: options.max_range,
            crc_fix: options.crc_fix,
            modeac: options.modeac,
            reliability: options.reliability,
            bind_address: options.bind_address,
            beast_ports: options.beast_ports,
            raw_ports: options.raw_ports,
            sbs_ports: options.sbs_ports,
            flush_size: options.flush_size,
            flush_interval_ms: options.flush_interval_ms,
            heartbeat_interval_ms: options.heartbeat_interval_ms,
            json_dir: options.json_dir.unwrap_or_else(|| PathBuf::from("./data")),
            globe_history_dir: options
                .globe_history_dir
                .unwrap_or_else(|| PathBuf::from("./globe_history")),
            json_interval_ms: options.json_interval_ms,
            trace_interval_s: options.trace_interval_s,
            heatmap: options.heatmap,
            heatmap_interval_s: options.heatmap_interval_s,
            heatmap_dir: options
                .heatmap_dir
                .unwrap_or_else(|| PathBuf::from("./heatmap")),
            state_dir: options
                .state_dir
                .unwrap_or_else(|| PathBuf::from("./internal_state")),
            uuid_file: options
                .uuid_file
                .unwrap_or_else(|| PathBuf::from("./receiver.uuid")),
            history_depth: options.history_depth,
            dedup_interval_ms: options.dedup_interval_ms,
            debug_flags: options.debug_flags,
        }
    }
}

impl Config {
    /// Parses command-line options and, if `--config` names a file, merges
    /// its contents underneath them (flags win on conflict). Returns the
    /// resolved configuration alongside the connector list, which isn't
    /// part of `Config` itself since it isn't (de)serializable.
    pub fn load() -> Result<(Config, Vec<Connector>), crate::error::Error> {
        let options = Options::parse();
        let sources = options.sources.clone();
        let config = if let Some(path) = &options.config {
            let text = std::fs::read_to_string(path)
                .map_err(|e| crate::error::Error::Config(format!("{}: {e}", path.display())))?;
            let file_config: FileConfig = toml::from_str(&text)
                .map_err(|e| crate::error::Error::Config(format!("{}: {e}", path.display())))?;
            file_config.merge_under(options)
        } else {
            options.into()
        };
        Ok((config, sources))
    }
}

/// The subset of [`Config`] a TOML file may set; anything left unset falls
/// through to the command-line default.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    lat: Option<f64>,
    lon: Option<f64>,
    max_range: Option<f64>,
    json_dir: Option<PathBuf>,
    globe_history_dir: Option<PathBuf>,
    state_dir: Option<PathBuf>,
    uuid_file: Option<PathBuf>,
}

impl FileConfig {
    fn merge_under(self, options: Options) -> Config {
        let mut config: Config = options.into();
        if let Some(lat) = self.lat {
            config.lat.get_or_insert(lat);
        }
        if let Some(lon) = self.lon {
            config.lon.get_or_insert(lon);
        }
        if let Some(max_range) = self.max_range {
            config.max_range.get_or_insert(max_range);
        }
        if let Some(dir) = self.json_dir {
            config.json_dir = dir;
        }
        if let Some(dir) = self.globe_history_dir {
            config.globe_history_dir = dir;
        }
        if let Some(dir) = self.state_dir {
            config.state_dir = dir;
        }
        if let Some(file) = self.uuid_file {
            config.uuid_file = file;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_fix_budget_parses_numeric_and_named_forms() {
        assert_eq!(CrcFixBudget::from_str("0").unwrap(), CrcFixBudget::None);
        assert_eq!(CrcFixBudget::from_str("single").unwrap(), CrcFixBudget::Single);
        assert_eq!(
            CrcFixBudget::from_str("aggressive").unwrap(),
            CrcFixBudget::Aggressive
        );
        assert!(CrcFixBudget::from_str("bogus").is_err());
    }

    #[test]
    fn file_config_only_overrides_unset_fields() {
        let options = Options {
            config: None,
            lat: Some(43.6),
            lon: None,
            max_range: None,
            crc_fix: CrcFixBudget::Single,
            modeac: false,
            reliability: 2,
            sources: Vec::new(),
            bind_address: "0.0.0.0".parse().unwrap(),
            beast_ports: Vec::new(),
            raw_ports: Vec::new(),
            sbs_ports: Vec::new(),
            flush_size: 1280,
            flush_interval_ms: 50,
            heartbeat_interval_ms: 15000,
            json_dir: None,
            globe_history_dir: None,
            json_interval_ms: 1000,
            trace_interval_s: 30,
            heatmap: false,
            heatmap_interval_s: 60,
            heatmap_dir: None,
            state_dir: None,
            uuid_file: None,
            history_depth: 50,
            dedup_interval_ms: 500,
            debug_flags: String::new(),
        };
        let file_config = FileConfig {
            lat: Some(1.0),
            lon: Some(1.37),
            ..Default::default()
        };
        let config = file_config.merge_under(options);
        assert_eq!(config.lat, Some(43.6));
        assert_eq!(config.lon, Some(1.37));
    }
}
