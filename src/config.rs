use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const API_KEY_ENV: &str = "OPNSENSE_API_KEY";
pub const API_SECRET_ENV: &str = "OPNSENSE_API_SECRET";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub key: String,
    pub secret: String,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ThresholdPair {
    pub warn: f64,
    pub crit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub cpu: ThresholdPair,
    pub memory: ThresholdPair,
    pub disk: ThresholdPair,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: ThresholdPair {
                warn: default_cpu_warn(),
                crit: default_cpu_crit(),
            },
            memory: ThresholdPair {
                warn: default_mem_warn(),
                crit: default_mem_crit(),
            },
            disk: ThresholdPair {
                warn: default_disk_warn(),
                crit: default_disk_crit(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub cpu_warn: Option<f64>,
    #[serde(default)]
    pub cpu_crit: Option<f64>,
    #[serde(default)]
    pub mem_warn: Option<f64>,
    #[serde(default)]
    pub mem_crit: Option<f64>,
    #[serde(default)]
    pub disk_warn: Option<f64>,
    #[serde(default)]
    pub disk_crit: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub key: Option<String>,
    pub secret: Option<String>,
    pub cpu_warn: Option<f64>,
    pub cpu_crit: Option<f64>,
    pub mem_warn: Option<f64>,
    pub mem_crit: Option<f64>,
    pub disk_warn: Option<f64>,
    pub disk_crit: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("missing required setting --{0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl FileConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        // An empty file decodes as YAML null; treat it as "no settings".
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })
    }
}

impl Config {
    // flag > env (credentials only) > file > default
    pub fn resolve(
        cli: Overrides,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env_value = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let host = cli.host.or(file.host).ok_or(ConfigError::Missing("host"))?;
        let key = cli
            .key
            .or_else(|| env_value(API_KEY_ENV))
            .or(file.key)
            .ok_or(ConfigError::Missing("key"))?;
        let secret = cli
            .secret
            .or_else(|| env_value(API_SECRET_ENV))
            .or(file.secret)
            .ok_or(ConfigError::Missing("secret"))?;

        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            cpu: ThresholdPair {
                warn: cli.cpu_warn.or(file.cpu_warn).unwrap_or(defaults.cpu.warn),
                crit: cli.cpu_crit.or(file.cpu_crit).unwrap_or(defaults.cpu.crit),
            },
            memory: ThresholdPair {
                warn: cli.mem_warn.or(file.mem_warn).unwrap_or(defaults.memory.warn),
                crit: cli.mem_crit.or(file.mem_crit).unwrap_or(defaults.memory.crit),
            },
            disk: ThresholdPair {
                warn: cli.disk_warn.or(file.disk_warn).unwrap_or(defaults.disk.warn),
                crit: cli.disk_crit.or(file.disk_crit).unwrap_or(defaults.disk.crit),
            },
        };

        let cfg = Config {
            host,
            port: cli.port.or(file.port).unwrap_or(default_port()),
            key,
            secret,
            thresholds,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation(
                "port must be in range 1..65535".to_string(),
            ));
        }
        if self.key.trim().is_empty() {
            return Err(ConfigError::Validation("key must not be empty".to_string()));
        }
        if self.secret.trim().is_empty() {
            return Err(ConfigError::Validation(
                "secret must not be empty".to_string(),
            ));
        }

        let pairs = [
            ("cpu", self.thresholds.cpu),
            ("mem", self.thresholds.memory),
            ("disk", self.thresholds.disk),
        ];
        for (name, pair) in pairs {
            if !pair.warn.is_finite() || !pair.crit.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "{name} thresholds must be finite numbers"
                )));
            }
        }

        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

const fn default_port() -> u16 {
    443
}

const fn default_cpu_warn() -> f64 {
    5.0
}

const fn default_cpu_crit() -> f64 {
    10.0
}

const fn default_mem_warn() -> f64 {
    75.0
}

const fn default_mem_crit() -> f64 {
    90.0
}

const fn default_disk_warn() -> f64 {
    80.0
}

const fn default_disk_crit() -> f64 {
    95.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn required_flags() -> Overrides {
        Overrides {
            host: Some("fw.example.net".to_string()),
            key: Some("k".to_string()),
            secret: Some("s".to_string()),
            ..Overrides::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_else_is_set() {
        let cfg = Config::resolve(required_flags(), FileConfig::default(), no_env)
            .expect("valid config");
        assert_eq!(cfg.port, 443);
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert_eq!(cfg.thresholds.cpu.warn, 5.0);
        assert_eq!(cfg.thresholds.memory.crit, 90.0);
        assert_eq!(cfg.thresholds.disk.warn, 80.0);
        assert_eq!(cfg.base_url(), "https://fw.example.net:443");
    }

    #[test]
    fn missing_host_is_reported() {
        let mut cli = required_flags();
        cli.host = None;
        let err = Config::resolve(cli, FileConfig::default(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("host")));
        assert_eq!(err.to_string(), "missing required setting --host");
    }

    #[test]
    fn flags_override_file_and_file_overrides_defaults() {
        let file: FileConfig = serde_yaml::from_str(
            "host: from-file\nport: 8443\ncpu_warn: 2.5\ndisk_crit: 99\n",
        )
        .unwrap();
        let mut cli = required_flags();
        cli.cpu_warn = Some(3.0);

        let cfg = Config::resolve(cli, file, no_env).unwrap();
        assert_eq!(cfg.host, "fw.example.net");
        assert_eq!(cfg.port, 8443);
        assert_eq!(cfg.thresholds.cpu.warn, 3.0);
        assert_eq!(cfg.thresholds.disk.crit, 99.0);
        assert_eq!(cfg.thresholds.disk.warn, 80.0);
    }

    #[test]
    fn credentials_fall_back_to_environment() {
        let mut cli = required_flags();
        cli.key = None;
        cli.secret = None;
        let file = FileConfig {
            key: Some("file-key".to_string()),
            secret: Some("file-secret".to_string()),
            ..FileConfig::default()
        };
        let env = |name: &str| match name {
            API_KEY_ENV => Some("env-key".to_string()),
            API_SECRET_ENV => Some("   ".to_string()),
            _ => None,
        };

        let cfg = Config::resolve(cli, file, env).unwrap();
        assert_eq!(cfg.key, "env-key");
        assert_eq!(cfg.secret, "file-secret");
    }

    #[test]
    fn validation_rejects_zero_port_and_nan_thresholds() {
        let mut cli = required_flags();
        cli.port = Some(0);
        let err = Config::resolve(cli, FileConfig::default(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let mut cli = required_flags();
        cli.mem_warn = Some(f64::NAN);
        let err = Config::resolve(cli, FileConfig::default(), no_env).unwrap_err();
        assert!(err.to_string().contains("mem thresholds"));
    }

    #[test]
    fn inverted_thresholds_are_accepted() {
        let mut cli = required_flags();
        cli.disk_warn = Some(95.0);
        cli.disk_crit = Some(80.0);
        Config::resolve(cli, FileConfig::default(), no_env).expect("classifier is total");
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let res: Result<FileConfig, _> = serde_yaml::from_str("hostname: typo\n");
        assert!(res.is_err());
    }

    #[test]
    fn example_yaml_parses() {
        let file: FileConfig = serde_yaml::from_str(Config::example_yaml()).unwrap();
        assert_eq!(file.port, Some(443));
        assert_eq!(file.mem_warn, Some(75.0));
    }
}
