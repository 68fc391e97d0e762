use crate::client::{ApiClient, ApiError, API_SYSTEM_DISK, API_SYSTEM_RESOURCES};
use crate::collectors::disk::{evaluate_disks, SystemDisk};
use crate::collectors::resources::{evaluate_cpu, evaluate_memory, SystemResources};
use crate::config::Config;
use crate::report::Report;
use tracing::info;

pub async fn run(cfg: &Config, client: &ApiClient) -> Result<Report, ApiError> {
    let mut report = Report::new();

    let resources: SystemResources = client.get_json(API_SYSTEM_RESOURCES).await?;
    evaluate_cpu(&resources, &cfg.thresholds.cpu, &mut report);
    evaluate_memory(&resources, &cfg.thresholds.memory, &mut report);

    let disk: SystemDisk = client.get_json(API_SYSTEM_DISK).await?;
    evaluate_disks(&disk, &cfg.thresholds.disk, &mut report);

    info!(
        severity = %report.severity(),
        messages = report.messages().len(),
        perfdata = report.perfdata().len(),
        "checks finished"
    );
    Ok(report)
}
