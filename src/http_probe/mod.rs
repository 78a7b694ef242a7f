pub mod probe;
pub mod result;

pub mod prelude {
    pub use super::probe::{Prober, resolve_host};
    pub use super::result::{ProbeFailure, ProbeOutcome, RunState, Sample};
}

use std::fmt::Write;

/// Flatten an error and its sources into a single line.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let cause = src.to_string();
        if !s.ends_with(&cause) {
            let _ = write!(s, ": {}", cause);
        }
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_report_flattens_chain() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("Connection refused", None))),
            ))),
        );
        assert_eq!(
            report(&err),
            "error sending request: client error (Connect): Connection refused"
        );
    }

    #[test]
    fn test_report_skips_repeated_cause() {
        let err = Layer("operation timed out", Some(Box::new(Layer("timed out", None))));
        assert_eq!(report(&err), "operation timed out");
    }
}
