use std::time::Duration;

use clap::Parser;

use super::target::Target;

/// Ping like tool for http, display return-code, latency etc.
#[derive(Parser, Debug, Clone)]
#[command(name = "httping")]
#[command(version)]
pub struct Cli {
    /// Verbose protocol tracing
    #[arg(short, long)]
    pub debug: bool,

    /// Abort the run on the first request error instead of reconnecting
    #[arg(short = 'e', long = "errorfail")]
    pub error_fail: bool,

    /// Suppress per-request output
    #[arg(short, long)]
    pub quiet: bool,

    /// No delay between requests
    #[arg(short, long)]
    pub flood: bool,

    /// Print the response headers of the first successful request at the end
    #[arg(short, long = "server")]
    pub server_report: bool,

    /// Number of requests, 0 keeps going until interrupted
    #[arg(short, long, default_value_t = 5)]
    pub count: u64,

    /// Seconds between requests (ignored with --flood)
    #[arg(short, long, default_value = "1", value_parser = parse_interval)]
    pub interval: Duration,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value = "30", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Use GET instead of HEAD
    #[arg(short = 'G', long)]
    pub get: bool,

    /// HTTP status code counted as a failure (repeatable)
    #[arg(long = "fail-code", value_name = "CODE")]
    pub fail_codes: Vec<u16>,

    /// URL to ping, must start with http:// or https://
    #[arg(value_parser = parse_target)]
    pub url: Target,
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if secs < 0.0 {
        return Err(format!("'{value}' must be a non-negative number of seconds"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("'{value}' seconds: {e}"))
}

fn parse_interval(value: &str) -> Result<Duration, String> {
    parse_seconds(value)
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let timeout = parse_seconds(value)?;
    if timeout.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(timeout)
}

fn parse_target(value: &str) -> Result<Target, String> {
    Target::parse(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["httping", "http://example.test/"]).expect("valid args");
        assert_eq!(cli.count, 5);
        assert_eq!(cli.interval, Duration::from_secs(1));
        assert_eq!(cli.timeout, Duration::from_secs(30));
        assert!(!cli.debug && !cli.error_fail && !cli.quiet && !cli.flood);
        assert!(!cli.server_report && !cli.get);
        assert!(cli.fail_codes.is_empty());
        assert_eq!(cli.url.host, "example.test");
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "httping", "-d", "-e", "-q", "-f", "-s", "-G", "-c", "0", "-i", "0.25", "-t", "2.5",
            "https://example.test:8443/x",
        ])
        .expect("valid args");
        assert!(cli.debug && cli.error_fail && cli.quiet && cli.flood);
        assert!(cli.server_report && cli.get);
        assert_eq!(cli.count, 0);
        assert_eq!(cli.interval, Duration::from_millis(250));
        assert_eq!(cli.timeout, Duration::from_millis(2500));
        assert_eq!(cli.url.port, 8443);
    }

    #[test]
    fn test_long_flags_and_fail_codes() {
        let cli = Cli::try_parse_from([
            "httping",
            "--errorfail",
            "--server",
            "--count",
            "3",
            "--fail-code",
            "500",
            "--fail-code",
            "503",
            "http://example.test/",
        ])
        .expect("valid args");
        assert!(cli.error_fail && cli.server_report);
        assert_eq!(cli.count, 3);
        assert_eq!(cli.fail_codes, vec![500, 503]);
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let err = Cli::try_parse_from(["httping", "example.test"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_requires_url() {
        let err = Cli::try_parse_from(["httping", "-c", "3"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_rejects_bad_durations() {
        assert!(Cli::try_parse_from(["httping", "-i", "-1", "http://example.test/"]).is_err());
        assert!(Cli::try_parse_from(["httping", "-i", "soon", "http://example.test/"]).is_err());
        assert!(Cli::try_parse_from(["httping", "-t", "0", "http://example.test/"]).is_err());
        assert!(Cli::try_parse_from(["httping", "-i", "0", "http://example.test/"]).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_durations() {
        for args in [
            ["httping", "-i", "1e20", "http://example.test/"],
            ["httping", "-t", "1e20", "http://example.test/"],
            ["httping", "-i", "inf", "http://example.test/"],
            ["httping", "-t", "NaN", "http://example.test/"],
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{args:?}");
        }
    }
}
