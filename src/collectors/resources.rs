use super::{parse_f64, parse_i64, require, FieldError};
use crate::config::ThresholdPair;
use crate::perfdata::PerfDatum;
use crate::report::{classify, Report, Severity};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemResources {
    // "0.10, 0.15, 0.20"
    #[serde(default)]
    pub load_average: Option<Value>,
    #[serde(default)]
    pub memory: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub used_bytes: i64,
    pub total_bytes: i64,
}

impl SystemResources {
    pub fn load_average_1min(&self) -> Result<f64, FieldError> {
        let raw = require(self.load_average.as_ref(), "load_average")?;
        let text = raw
            .as_str()
            .ok_or_else(|| FieldError::invalid("load_average", raw))?;

        let averages = text
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| FieldError::invalid("load_average", raw))?;

        averages
            .first()
            .copied()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FieldError::invalid("load_average", raw))
    }

    pub fn memory_usage(&self) -> Result<MemoryUsage, FieldError> {
        let memory = require(self.memory.as_ref(), "memory")?;
        let fields = memory
            .as_object()
            .ok_or_else(|| FieldError::invalid("memory", memory))?;

        let total_bytes = parse_i64(require(fields.get("total"), "memory.total")?, "memory.total")?;
        let used_bytes = parse_i64(require(fields.get("used"), "memory.used")?, "memory.used")?;
        Ok(MemoryUsage {
            used_bytes,
            total_bytes,
        })
    }
}

pub fn evaluate_cpu(data: &SystemResources, thresholds: &ThresholdPair, report: &mut Report) {
    let load = match data.load_average_1min() {
        Ok(load) => load,
        Err(err) => {
            warn!(error = %err, "cpu load unavailable");
            report.unknown("CPU Load data UNAVAILABLE");
            return;
        }
    };

    let severity = classify(load, thresholds);
    report.raise(severity);
    report.push_message(format!("CPU Load 1-min: {load:.2} ({severity})"));
    report.push_perfdata(
        PerfDatum::new("cpu_load_1min", format!("{load:.2}"))
            .thresholds(*thresholds)
            .min("0.0"),
    );
}

pub fn evaluate_memory(data: &SystemResources, thresholds: &ThresholdPair, report: &mut Report) {
    let usage = match data.memory_usage() {
        Ok(usage) => usage,
        Err(err) => {
            warn!(error = %err, "memory usage unavailable");
            report.unknown("Memory data UNAVAILABLE");
            return;
        }
    };

    if usage.total_bytes <= 0 {
        warn!(total = usage.total_bytes, "memory total is not positive");
        report.unknown("Memory data UNAVAILABLE (Total=0)");
        return;
    }

    let pct = usage.used_bytes as f64 / usage.total_bytes as f64 * 100.0;
    let severity: Severity = classify(pct, thresholds);
    report.raise(severity);
    report.push_message(format!("Memory: {pct:.1}% ({severity})"));
    report.push_perfdata(
        PerfDatum::new("mem_usage_pct", format!("{pct:.1}"))
            .unit("%")
            .thresholds(*thresholds)
            .min("0")
            .max("100"),
    );
    report.push_perfdata(PerfDatum::new("mem_used_bytes", usage.used_bytes.to_string()).unit("B"));
    report.push_perfdata(
        PerfDatum::new("mem_total_bytes", usage.total_bytes.to_string()).unit("B"),
    );
}
