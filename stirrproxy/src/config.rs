use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stirrproxy")]
#[command(about = "Serves the STIRR channel lineup as an M3U playlist and XMLTV guide")]
pub struct Args {
    /// Station to fetch the lineup for (auto-detected when unset)
    #[arg(long, env = "STIRR_STATION_ID")]
    pub station_id: Option<String>,

    /// HTTP server port
    #[arg(short, long, env = "PORT", default_value = "80")]
    pub port: u16,

    /// Seconds between lineup refreshes
    #[arg(long, env = "STIRR_REFRESH_INTERVAL", default_value = "1800")]
    pub refresh_interval: u64,

    /// Timeout in seconds for each request to the lineup service
    #[arg(long, env = "STIRR_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable debug logging
    #[arg(short, long, env = "STIRR_VERBOSE")]
    pub verbose: bool,
}

/**
    Resolved runtime settings.
*/
#[derive(Debug, Clone)]
pub struct Config {
    pub station_id: Option<String>,
    pub listen_addr: SocketAddr,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub verbose: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            station_id: args
                .station_id
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], args.port)),
            // A zero interval would spin; clamp to one second
            refresh_interval: Duration::from_secs(args.refresh_interval.max(1)),
            request_timeout: Duration::from_secs(args.request_timeout.max(1)),
            verbose: args.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let args = Args::try_parse_from([
            "stirrproxy",
            "--station-id",
            "wkrc",
            "--port",
            "8080",
            "--refresh-interval",
            "600",
            "--request-timeout",
            "10",
            "--verbose",
        ])
        .unwrap();

        let config = Config::from(args);
        assert_eq!(config.station_id.as_deref(), Some("wkrc"));
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.verbose);
    }

    #[test]
    fn test_blank_station_means_auto_detect() {
        let args = Args::try_parse_from(["stirrproxy", "--station-id", "  "]).unwrap();
        assert_eq!(Config::from(args).station_id, None);
    }

    #[test]
    fn test_zero_durations_are_clamped() {
        let args = Args::try_parse_from([
            "stirrproxy",
            "--refresh-interval",
            "0",
            "--request-timeout",
            "0",
        ])
        .unwrap();

        let config = Config::from(args);
        assert_eq!(config.refresh_interval, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Args::try_parse_from(["stirrproxy", "--port", "http"]).is_err());
    }
}
