use crate::config::ThresholdPair;
use std::fmt;

// nagiosplugin::Metric formats the value itself and cannot emit an empty max
// after a min, so the legacy byte layout is written here.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfDatum {
    label: String,
    value: String,
    unit: &'static str,
    thresholds: Option<ThresholdPair>,
    min: Option<String>,
    max: Option<String>,
}

impl PerfDatum {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            unit: "",
            thresholds: None,
            min: None,
            max: None,
        }
    }

    pub fn unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    pub fn thresholds(mut self, thresholds: ThresholdPair) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn min(mut self, min: impl Into<String>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<String>) -> Self {
        self.max = Some(max.into());
        self
    }
}

impl fmt::Display for PerfDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'={}{}", self.label, self.value, self.unit)?;

        let has_range = self.min.is_some() || self.max.is_some();
        if self.thresholds.is_none() && !has_range {
            return Ok(());
        }
        match &self.thresholds {
            Some(t) => write!(f, ";{};{}", t.warn, t.crit)?,
            None => f.write_str(";;")?,
        }
        if has_range {
            write!(
                f,
                ";{};{}",
                self.min.as_deref().unwrap_or_default(),
                self.max.as_deref().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_value_with_unit() {
        let d = PerfDatum::new("mem_used_bytes", "950").unit("B");
        assert_eq!(d.to_string(), "'mem_used_bytes'=950B");
    }

    #[test]
    fn full_percentage_datum() {
        let d = PerfDatum::new("disk_root_pct", "85.0")
            .unit("%")
            .thresholds(ThresholdPair {
                warn: 80.0,
                crit: 95.0,
            })
            .min("0")
            .max("100");
        assert_eq!(d.to_string(), "'disk_root_pct'=85.0%;80;95;0;100");
    }

    #[test]
    fn open_upper_bound_keeps_trailing_separator() {
        let d = PerfDatum::new("cpu_load_1min", "3.00")
            .thresholds(ThresholdPair {
                warn: 5.0,
                crit: 12.5,
            })
            .min("0.0");
        assert_eq!(d.to_string(), "'cpu_load_1min'=3.00;5;12.5;0.0;");
    }

    #[test]
    fn range_without_thresholds_leaves_them_empty() {
        let d = PerfDatum::new("x", "1").min("0").max("10");
        assert_eq!(d.to_string(), "'x'=1;;;0;10");
    }

    #[test]
    fn caller_precision_is_kept_verbatim() {
        let cpu = PerfDatum::new("cpu_load_1min", "10.00")
            .thresholds(ThresholdPair {
                warn: 5.0,
                crit: 10.0,
            })
            .min("0.0");
        let mem = PerfDatum::new("mem_usage_pct", "90.0")
            .unit("%")
            .thresholds(ThresholdPair {
                warn: 75.0,
                crit: 90.0,
            })
            .min("0")
            .max("100");
        assert_eq!(cpu.to_string().as_bytes(), b"'cpu_load_1min'=10.00;5;10;0.0;");
        assert_eq!(mem.to_string().as_bytes(), b"'mem_usage_pct'=90.0%;75;90;0;100");
    }
}
