use std::future::Future;
use std::io::{self, Write};
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use hyper::ext::ReasonPhrase;
use reqwest::{Client, redirect::Policy};
use tokio::time::sleep;
use url::Host;

use super::report;
use super::result::{ProbeFailure, ProbeOutcome, RunState, Sample};
use crate::config::app_config::{ProbeConfig, setup_resolver};
use crate::config::target::{Scheme, Target};
use crate::error::{HttpingError, Result};
use crate::stats::report::{failure_line, statistics_lines, success_line};

/// Interim statistics are printed every this many requests.
pub const REPORT_INTERVAL: u64 = 60;

/// Whether an interim report follows request `seq`. Never after the last
/// request of a bounded run, the final report covers it.
pub fn interim_due(seq: u64, count: u64) -> bool {
    let last = count != 0 && seq >= count;
    !last && seq % REPORT_INTERVAL == 0
}

/// Resolve the target host to the address every request will go to.
/// IP literals are returned as-is without touching the resolver.
pub async fn resolve_host(target: &Target, config: &ProbeConfig) -> Result<IpAddr> {
    match target.url.host() {
        Some(Host::Ipv4(ip)) => return Ok(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => return Ok(IpAddr::V6(ip)),
        _ => {}
    }

    let resolver = setup_resolver(config.dns_hosts.as_deref(), config.timeout)?;
    let lookup = resolver
        .lookup_ip(target.host.as_str())
        .await
        .map_err(|e| HttpingError::HostNotFound {
            host: target.host.clone(),
            reason: e.to_string(),
        })?;

    let ip = lookup.iter().next().ok_or_else(|| HttpingError::HostNotFound {
        host: target.host.clone(),
        reason: "no addresses returned".to_string(),
    })?;
    log::debug!("Resolved {} to {}", target.host, ip);
    Ok(ip)
}

fn build_client(config: &ProbeConfig, target: &Target, ip: IpAddr) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .redirect(Policy::none())
        .https_only(target.scheme == Scheme::Https)
        .resolve(&target.host, SocketAddr::new(ip, target.port))
        .connection_verbose(config.debug)
        .build()?;
    Ok(client)
}

fn classify_error(err: &reqwest::Error) -> ProbeFailure {
    // reqwest's own message repeats the url, the cause chain is what matters
    let message = match std::error::Error::source(err) {
        Some(src) => report(src),
        None => err.to_string(),
    };
    if err.is_timeout() {
        ProbeFailure::Timeout(message)
    } else if err.is_connect() {
        ProbeFailure::Connect(message)
    } else {
        ProbeFailure::Transport(message)
    }
}

/// Sequentially pings one target and accumulates the results.
pub struct Prober {
    config: ProbeConfig,
    target: Target,
    ip: IpAddr,
    client: Client,
    state: RunState,
    out: Box<dyn Write + Send>,
}

impl Prober {
    pub fn new(config: ProbeConfig, target: Target, ip: IpAddr) -> Result<Prober> {
        let client = build_client(&config, &target, ip)?;
        Ok(Prober {
            config,
            target,
            ip,
            client,
            state: RunState::new(),
            out: Box::new(io::stdout()),
        })
    }

    /// Send per-request lines and interim reports to `out` instead of stdout.
    pub fn with_output<W>(mut self, out: W) -> Prober
    where
        W: Write + Send + 'static,
    {
        self.out = Box::new(out);
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Close the client and hand back the accumulated state.
    pub fn finish(self) -> RunState {
        drop(self.client);
        self.state
    }

    /// Drop the client together with its pooled connections.
    fn reconnect(&mut self) -> Result<()> {
        log::debug!("Rebuilding HTTP client for {}", self.target);
        self.client = build_client(&self.config, &self.target, self.ip)?;
        Ok(())
    }

    fn failed(&self, failure: ProbeFailure) -> ProbeOutcome {
        if self.config.fail_on_error {
            ProbeOutcome::Fatal(failure)
        } else {
            ProbeOutcome::Recoverable(failure)
        }
    }

    /// Perform a single timed request. The body is drained before the clock stops.
    pub async fn probe_once(&self, seq: u64) -> ProbeOutcome {
        let method = self.config.method.clone();
        log::debug!("{} {} seq={}", method, self.target.path, seq);

        let request = self.client.request(method, self.target.url.clone());
        let start = Instant::now();
        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            // hyper only keeps the phrase when it differs from the canonical one
            let reason = match response.extensions().get::<ReasonPhrase>() {
                Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
                None => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, reason, headers, body.len() as u64))
        }
        .await;
        let time_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok((status, reason, headers, bytes)) => {
                log::debug!("Response seq={} status={} headers={:?}", seq, status, headers);
                if self.config.fail_codes.contains(&status.as_u16()) {
                    return self.failed(ProbeFailure::Status {
                        code: status.as_u16(),
                        reason,
                    });
                }
                ProbeOutcome::Success {
                    sample: Sample {
                        seq,
                        time_ms,
                        status: status.as_u16(),
                        reason,
                        bytes,
                    },
                    headers,
                }
            }
            Err(e) => {
                log::debug!("Request seq={} failed: {:?}", seq, e);
                self.failed(classify_error(&e))
            }
        }
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}") {
            log::warn!("Failed to write output: {}", e);
        }
    }

    fn print_statistics(&mut self) {
        let lines = statistics_lines(self.target.url.as_str(), &self.state.statistics());
        for line in &lines {
            self.emit(line);
        }
    }

    /// Run the probe loop until `count` requests are done or `shutdown`
    /// completes. An in-flight request is abandoned on shutdown and not counted.
    ///
    /// Returns `HttpingError::Aborted` on the first failure when fail-on-error
    /// is set; the state up to and including that failure stays available.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let count = self.config.count;
        let delay = self.config.delay();
        let mut seq: u64 = 0;

        while count == 0 || seq < count {
            seq += 1;

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::debug!("Interrupted during seq={}", seq);
                    break;
                }
                outcome = self.probe_once(seq) => outcome,
            };

            match outcome {
                ProbeOutcome::Success { sample, headers } => {
                    if !self.config.quiet {
                        let line = success_line(&self.target, self.ip, &sample);
                        self.emit(&line);
                    }
                    self.state.record_success(sample, headers);
                }
                ProbeOutcome::Recoverable(failure) => {
                    self.state.record_failure();
                    if !self.config.quiet {
                        let line = failure_line(&self.target, self.ip, seq, &failure);
                        self.emit(&line);
                    }
                    self.reconnect()?;
                }
                ProbeOutcome::Fatal(failure) => {
                    self.state.record_failure();
                    if !self.config.quiet {
                        let line = failure_line(&self.target, self.ip, seq, &failure);
                        self.emit(&line);
                    }
                    return Err(HttpingError::Aborted {
                        seq,
                        reason: failure.to_string(),
                    });
                }
            }

            if interim_due(seq, count) {
                self.print_statistics();
            }
            if count != 0 && seq >= count {
                break;
            }
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        log::debug!("Interrupted after seq={}", seq);
                        break;
                    }
                    _ = sleep(delay) => {}
                }
            }
        }

        Ok(())
    }
}
