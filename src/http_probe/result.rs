use std::fmt;

use reqwest::header::HeaderMap;

use crate::stats::Statistics;

/// One successful request.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub seq: u64,
    /// Round-trip time in milliseconds.
    pub time_ms: f64,
    pub status: u16,
    pub reason: String,
    /// Body bytes drained from the response.
    pub bytes: u64,
}

/// Why a single request did not count as a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    Connect(String),
    Timeout(String),
    Transport(String),
    Status { code: u16, reason: String },
}

impl ProbeFailure {
    /// Status code observed, if the server answered at all.
    pub fn code(&self) -> Option<u16> {
        match self {
            ProbeFailure::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Connect(msg) => write!(f, "connect failed: {msg}"),
            ProbeFailure::Timeout(msg) => write!(f, "timed out: {msg}"),
            ProbeFailure::Transport(msg) => write!(f, "{msg}"),
            ProbeFailure::Status { reason, .. } => write!(f, "{reason}"),
        }
    }
}

/// Outcome of a single request, as seen by the run loop.
#[derive(Debug)]
pub enum ProbeOutcome {
    Success { sample: Sample, headers: HeaderMap },
    Recoverable(ProbeFailure),
    Fatal(ProbeFailure),
}

/// Everything accumulated over a run.
#[derive(Debug, Default)]
pub struct RunState {
    samples: Vec<Sample>,
    failures: u64,
    server_headers: Option<HeaderMap>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a success. Only the headers of the first success are kept.
    pub fn record_success(&mut self, sample: Sample, headers: HeaderMap) {
        if self.server_headers.is_none() {
            self.server_headers = Some(headers);
        }
        self.samples.push(sample);
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn successes(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn attempts(&self) -> u64 {
        self.successes() + self.failures
    }

    pub fn server_headers(&self) -> Option<&HeaderMap> {
        self.server_headers.as_ref()
    }

    /// Headers of the first success rendered as `name: value` lines.
    pub fn server_header_lines(&self) -> Vec<String> {
        self.server_headers
            .iter()
            .flat_map(|headers| headers.iter())
            .map(|(name, value)| {
                format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()))
            })
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        let times: Vec<f64> = self.samples.iter().map(|s| s.time_ms).collect();
        Statistics::from_times(&times, self.failures)
    }
}
