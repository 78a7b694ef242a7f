use std::net::IpAddr;

use super::Statistics;
use crate::config::target::Target;
use crate::http_probe::result::{ProbeFailure, Sample};

pub fn banner(target: &Target, ip: IpAddr) -> String {
    format!("HTTPING {} ({})", target.host, ip)
}

pub fn success_line(target: &Target, ip: IpAddr, sample: &Sample) -> String {
    format!(
        "{} bytes from {} ({}) seq={} code={} ({}) time={:.3} ms",
        sample.bytes, target.host, ip, sample.seq, sample.status, sample.reason, sample.time_ms
    )
}

pub fn failure_line(target: &Target, ip: IpAddr, seq: u64, failure: &ProbeFailure) -> String {
    let code = failure
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string());
    format!(
        "ERROR from {} ({}) seq={} code={} ({}) time=none ms",
        target.host, ip, seq, code, failure
    )
}

/// The three statistics lines printed at the end of a run and at every
/// report interval.
pub fn statistics_lines(url: &str, stats: &Statistics) -> [String; 3] {
    [
        format!("--- {url} ping statistics ---"),
        format!("{} total, {} ok, {} failed", stats.total, stats.ok, stats.failed),
        format!(
            "round-trip min/avg/max/stdev = {:.3}/{:.3}/{:.3}/{:.3} ms",
            stats.min, stats.avg, stats.max, stats.stdev
        ),
    ]
}
