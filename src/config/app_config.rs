use std::env;
use std::{net::IpAddr, time::Duration};

use log::LevelFilter;
use reqwest::Method;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
};

use super::cli::Cli;
use crate::error::{HttpingError, Result};

pub const USER_AGENT_ENV: &str = "HTTPING_USER_AGENT";
pub const DNS_HOSTS_ENV: &str = "HTTPING_DNS_HOSTS";

/// Everything the prober needs to know about a run, built once at startup.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Number of requests, 0 means unbounded.
    pub count: u64,
    pub interval: Duration,
    pub timeout: Duration,
    pub method: Method,
    pub user_agent: String,
    pub fail_on_error: bool,
    pub fail_codes: Vec<u16>,
    pub quiet: bool,
    pub flood: bool,
    pub server_report: bool,
    pub debug: bool,
    /// Nameservers to query instead of the system configuration.
    pub dns_hosts: Option<Vec<String>>,
}

pub fn default_user_agent() -> String {
    format!("httping/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            count: 5,
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            method: Method::HEAD,
            user_agent: default_user_agent(),
            fail_on_error: false,
            fail_codes: Vec::new(),
            quiet: false,
            flood: false,
            server_report: false,
            debug: false,
            dns_hosts: None,
        }
    }
}

impl ProbeConfig {
    /// Build the run configuration from the command line and process environment.
    pub fn load(cli: &Cli) -> ProbeConfig {
        Self::from_cli(cli, |key| env::var(key).ok())
    }

    /// Build the run configuration from the command line, reading overrides
    /// through `lookup` instead of the process environment.
    pub fn from_cli<F>(cli: &Cli, lookup: F) -> ProbeConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_agent = lookup(USER_AGENT_ENV)
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(default_user_agent);

        let dns_hosts = lookup(DNS_HOSTS_ENV)
            .map(|hosts| {
                hosts
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|hosts| !hosts.is_empty());

        let method = if cli.get { Method::GET } else { Method::HEAD };

        let config = ProbeConfig {
            count: cli.count,
            interval: cli.interval,
            timeout: cli.timeout,
            method,
            user_agent,
            fail_on_error: cli.error_fail,
            fail_codes: cli.fail_codes.clone(),
            quiet: cli.quiet,
            flood: cli.flood,
            server_report: cli.server_report,
            debug: cli.debug,
            dns_hosts,
        };
        log::debug!("Using probe config: {:?}", config);
        config
    }

    /// Pause between two consecutive requests, zero in flood mode.
    pub fn delay(&self) -> Duration {
        if self.flood {
            Duration::ZERO
        } else {
            self.interval
        }
    }
}

/// Initialise the `log` backend. `RUST_LOG` is applied on top of the defaults.
pub fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::new();
    if debug {
        builder
            .filter_level(LevelFilter::Debug)
            .filter_module("reqwest::connect::verbose", LevelFilter::Trace);
    } else {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.parse_default_env();
    let _ = builder.try_init();
}

/// Setup a DNS resolver.
/// Without explicit hosts the system configuration is used. With hosts, each
/// entry is queried over TCP with 2 attempts and the given per-query timeout.
pub fn setup_resolver(dns_hosts: Option<&[String]>, timeout: Duration) -> Result<TokioAsyncResolver> {
    let Some(dns_hosts) = dns_hosts else {
        return TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| HttpingError::Resolver(e.to_string()));
    };

    let mut opts = ResolverOpts::default();
    opts.attempts = 2;
    opts.timeout = timeout;

    let mut name_servers = NameServerConfigGroup::new();

    for host in dns_hosts {
        let ip: IpAddr = host
            .parse()
            .map_err(|_| HttpingError::Resolver(format!("invalid DNS host '{host}'")))?;
        name_servers.push(NameServerConfig {
            socket_addr: (ip, 53).into(),
            protocol: Protocol::Tcp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    log::info!("Using DNS hosts: {:?}", dns_hosts);
    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    Ok(TokioAsyncResolver::tokio(resolver_config, opts))
}
