mod check;
mod client;
mod collectors;
mod config;
mod perfdata;
mod report;
#[cfg(test)]
mod testutil;

use clap::error::ErrorKind;
use clap::Parser;
use client::ApiClient;
use config::{Config, ConfigError, FileConfig, Overrides};
use report::{Report, Severity};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Checks CPU load, memory and disk usage of an OPNsense firewall through its
/// diagnostics API and reports in the Nagios plugin format.
#[derive(Parser, Debug)]
#[command(name = "check-opnsense")]
#[command(version, about)]
struct Cli {
    /// Firewall IP address or hostname
    #[arg(long)]
    host: Option<String>,
    /// API key (or OPNSENSE_API_KEY)
    #[arg(long)]
    key: Option<String>,
    /// API secret (or OPNSENSE_API_SECRET)
    #[arg(long)]
    secret: Option<String>,
    /// API port [default: 443]
    #[arg(long)]
    port: Option<u16>,
    /// 1-min load average warning threshold [default: 5.0]
    #[arg(long)]
    cpu_warn: Option<f64>,
    /// 1-min load average critical threshold [default: 10.0]
    #[arg(long)]
    cpu_crit: Option<f64>,
    /// Memory usage % warning threshold [default: 75]
    #[arg(long)]
    mem_warn: Option<f64>,
    /// Memory usage % critical threshold [default: 90]
    #[arg(long)]
    mem_crit: Option<f64>,
    /// Disk usage % warning threshold [default: 80]
    #[arg(long)]
    disk_warn: Option<f64>,
    /// Disk usage % critical threshold [default: 95]
    #[arg(long)]
    disk_crit: Option<f64>,
    /// Optional YAML file with any of the settings above
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print an example config file and exit
    #[arg(long)]
    print_default_config: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            key: self.key.clone(),
            secret: self.secret.clone(),
            cpu_warn: self.cpu_warn,
            cpu_crit: self.cpu_crit,
            mem_warn: self.mem_warn,
            mem_crit: self.mem_crit,
            disk_warn: self.disk_warn,
            disk_crit: self.disk_crit,
        }
    }

    fn load_config(&self) -> Result<Config, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::load_from_file(path)?,
            None => FileConfig::default(),
        };
        Config::resolve(self.overrides(), file, |name| std::env::var(name).ok())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => exit_unknown(&usage_error_line(&err)),
    };
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            exit_unknown(&err.to_string());
        }
    };
    info!(host = %cfg.host, port = cfg.port, "starting check");

    let client = match ApiClient::new(&cfg) {
        Ok(client) => client,
        Err(err) => exit_unknown(&err.to_string()),
    };

    let code = match check::run(&cfg, &client).await {
        Ok(report) => {
            println!("{}", report.render());
            report.severity().exit_code()
        }
        Err(err) => {
            error!(error = %err, "check aborted");
            println!("{}", Report::fatal(&err));
            Severity::Unknown.exit_code()
        }
    };
    std::process::exit(code);
}

// stdout is reserved for the plugin line
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn usage_error_line(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

fn exit_unknown(message: &str) -> ! {
    println!("{} - {}", Severity::Unknown, message);
    std::process::exit(Severity::Unknown.exit_code());
}
