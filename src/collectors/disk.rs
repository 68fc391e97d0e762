use super::{parse_f64, require, FieldError};
use crate::config::ThresholdPair;
use crate::perfdata::PerfDatum;
use crate::report::{classify, Report};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub const PRIMARY_MOUNT_POINTS: [&str; 6] = ["/", "/usr", "/var", "/home", "/cf", "/var/log"];

const PSEUDO_MOUNT_PREFIXES: [&str; 4] = ["/dev", "/proc", "/tmp", "/var/run"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemDisk {
    #[serde(default)]
    pub devices: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskDevice {
    pub mountpoint: Option<String>,
    pub used_pct: Option<Value>,
}

impl SystemDisk {
    // A non-list `devices` or a non-object entry is dropped here, so it ends up
    // in the "no primary filesystem" path instead of failing the whole payload.
    pub fn devices(&self) -> Vec<DiskDevice> {
        let entries = match &self.devices {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                warn!(devices = %other, "disk payload 'devices' is not a list");
                return Vec::new();
            }
        };

        entries
            .iter()
            .filter_map(|entry| match entry.as_object() {
                Some(fields) => Some(DiskDevice {
                    mountpoint: fields
                        .get("mountpoint")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    used_pct: fields.get("used_pct").cloned(),
                }),
                None => {
                    warn!(entry = %entry, "skipping malformed disk entry");
                    None
                }
            })
            .collect()
    }
}

impl DiskDevice {
    pub fn mountpoint(&self) -> Option<&str> {
        self.mountpoint.as_deref()
    }

    pub fn used_pct(&self) -> Result<f64, FieldError> {
        parse_f64(require(self.used_pct.as_ref(), "used_pct")?, "used_pct")
    }
}

pub fn is_primary_mount(mountpoint: &str) -> bool {
    PRIMARY_MOUNT_POINTS.contains(&mountpoint)
}

pub fn perfdata_label(mountpoint: &str) -> String {
    let label = mountpoint.replace('/', "_");
    let label = label.trim_matches('_');
    if label.is_empty() {
        "root".to_string()
    } else {
        label.to_string()
    }
}

pub fn evaluate_disks(data: &SystemDisk, thresholds: &ThresholdPair, report: &mut Report) {
    let devices = data.devices();
    let mut evaluated = 0_usize;

    for device in &devices {
        let Some(mountpoint) = device.mountpoint().filter(|m| is_primary_mount(m)) else {
            debug!(mountpoint = ?device.mountpoint, "skipping non-primary mount");
            continue;
        };

        let pct = match device.used_pct() {
            Ok(pct) => pct,
            Err(err) => {
                warn!(mountpoint, error = %err, "disk usage unavailable");
                report.unknown(format!(
                    "Disk {mountpoint} data UNKNOWN (Parsing error on 'used_pct')"
                ));
                continue;
            }
        };

        let severity = classify(pct, thresholds);
        report.raise(severity);
        report.push_message(format!("Disk {mountpoint}: {pct:.1}% ({severity})"));
        report.push_perfdata(
            PerfDatum::new(
                format!("disk_{}_pct", perfdata_label(mountpoint)),
                format!("{pct:.1}"),
            )
            .unit("%")
            .thresholds(*thresholds)
            .min("0")
            .max("100"),
        );
        evaluated += 1;
    }

    if evaluated == 0 {
        warn!(devices = devices.len(), "no primary filesystem evaluated");
        report.unknown(no_primary_message(&devices));
    }
}

fn no_primary_message(devices: &[DiskDevice]) -> String {
    let available: Vec<&str> = devices
        .iter()
        .filter_map(DiskDevice::mountpoint)
        .filter(|m| !m.is_empty())
        .filter(|m| !PSEUDO_MOUNT_PREFIXES.iter().any(|p| m.starts_with(p)))
        .collect();
    let available = if available.is_empty() {
        "None".to_string()
    } else {
        available.join(", ")
    };

    format!(
        "Disk check UNKNOWN: No primary filesystem found ({}). Available mounts: [{}]",
        PRIMARY_MOUNT_POINTS.join(", "),
        available
    )
}
