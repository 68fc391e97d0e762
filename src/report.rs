use crate::client::ApiError;
use crate::config::ThresholdPair;
use crate::perfdata::PerfDatum;
use nagiosplugin::ServiceState;
use std::fmt;

// nagiosplugin ranks UNKNOWN below WARNING; here UNKNOWN must win the worst-of
// fold, so the ordering lives on this enum and everything else is delegated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn state(self) -> ServiceState {
        match self {
            Severity::Ok => ServiceState::Ok,
            Severity::Warning => ServiceState::Warning,
            Severity::Critical => ServiceState::Critical,
            Severity::Unknown => ServiceState::Unknown,
        }
    }

    pub fn exit_code(self) -> i32 {
        self.state().exit_code()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state())
    }
}

pub fn classify(value: f64, thresholds: &ThresholdPair) -> Severity {
    if value >= thresholds.crit {
        Severity::Critical
    } else if value >= thresholds.warn {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    severity: Severity,
    messages: Vec<String>,
    perfdata: Vec<PerfDatum>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn perfdata(&self) -> &[PerfDatum] {
        &self.perfdata
    }

    pub fn raise(&mut self, severity: Severity) {
        self.severity = self.severity.max(severity);
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn push_perfdata(&mut self, datum: PerfDatum) {
        self.perfdata.push(datum);
    }

    pub fn unknown(&mut self, message: impl Into<String>) {
        self.push_message(message);
        self.raise(Severity::Unknown);
    }

    pub fn render(&self) -> String {
        let perfdata = self
            .perfdata
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{} - {} | {}",
            self.severity,
            self.messages.join(" | "),
            perfdata
        )
    }

    pub fn fatal(err: &ApiError) -> String {
        format!("{} - {}", Severity::Unknown, err)
    }
}
