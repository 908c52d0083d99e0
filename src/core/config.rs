use crate::core::registry::{SeriesDefinition, default_definitions};
use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::{debug, info};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.138 Safari/537.36";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FredProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlbertaProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NemwebProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub fred: Option<FredProviderConfig>,
    pub alberta: Option<AlbertaProviderConfig>,
    pub nemweb: Option<NemwebProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fred: Some(FredProviderConfig {
                base_url: "https://fred.stlouisfed.org".to_string(),
            }),
            alberta: Some(AlbertaProviderConfig {
                base_url: "https://www.alberta.ca".to_string(),
            }),
            nemweb: Some(NemwebProviderConfig {
                base_url: "http://www.nemweb.com.au".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub store_path: PathBuf,
    pub report_path: PathBuf,
    pub splitter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            store_path: PathBuf::from("data/indexes.json"),
            report_path: PathBuf::from("README.md"),
            splitter: "<br>".to_string(),
        }
    }
}

/// What the collector does when one series fails to fetch or parse.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run on the first failure.
    #[default]
    Abort,
    /// Log the failure and continue with the remaining series.
    Skip,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_definitions")]
    pub series: Vec<SeriesDefinition>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub on_error: FailurePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            series: default_definitions(),
            providers: ProvidersConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            on_error: FailurePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            info!(
                "No config file at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "macrofeed", "macrofeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.http.timeout_secs > 0,
            "http.timeout_secs must be at least 1 second"
        );
        Ok(())
    }

    pub fn fred_base_url(&self) -> &str {
        self.providers
            .fred
            .as_ref()
            .map_or("https://fred.stlouisfed.org", |p| &p.base_url)
    }

    pub fn alberta_base_url(&self) -> &str {
        self.providers
            .alberta
            .as_ref()
            .map_or("https://www.alberta.ca", |p| &p.base_url)
    }

    pub fn nemweb_base_url(&self) -> &str {
        self.providers
            .nemweb
            .as_ref()
            .map_or("http://www.nemweb.com.au", |p| &p.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
series:
  - name: "FX US->EU"
    adapter: fred_fx
    params:
      currency_from: US
      currency_to: EU
  - name: "Alberta Hub"
    adapter: alberta_hub
providers:
  fred:
    base_url: "http://example.com/fred"
  nemweb:
    base_url: "http://example.com/nemweb"
http:
  timeout_secs: 5
output:
  store_path: "out/series.json"
  splitter: "<!-- data -->"
on_error: skip
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.series.len(), 2);
        assert_eq!(config.series[0].name, "FX US->EU");
        assert_eq!(config.series[0].adapter, "fred_fx");
        assert_eq!(
            config.series[0].params.get("currency_to").map(String::as_str),
            Some("EU")
        );
        assert!(config.series[1].params.is_empty());

        assert_eq!(config.fred_base_url(), "http://example.com/fred");
        assert_eq!(config.nemweb_base_url(), "http://example.com/nemweb");
        assert!(config.providers.alberta.is_none());
        assert_eq!(config.alberta_base_url(), "https://www.alberta.ca");

        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.output.store_path, PathBuf::from("out/series.json"));
        assert_eq!(config.output.report_path, PathBuf::from("README.md"));
        assert_eq!(config.output.splitter, "<!-- data -->");
        assert_eq!(config.on_error, FailurePolicy::Skip);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.series.len(), 7);
        assert_eq!(config.series[4].name, "GDP US");
        assert_eq!(config.output.store_path, PathBuf::from("data/indexes.json"));
        assert_eq!(config.output.splitter, "<br>");
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.on_error, FailurePolicy::Abort);
        assert_eq!(config.fred_base_url(), "https://fred.stlouisfed.org");
    }

    #[test]
    fn test_load_from_path_reports_missing_file() {
        let result = AppConfig::load_from_path("/nonexistent/macrofeed/config.yaml");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to read config file")
        );
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "http:\n  timeout_secs: 0\n").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid config file"));
        assert_eq!(
            err.root_cause().to_string(),
            "http.timeout_secs must be at least 1 second"
        );

        fs::write(&path, "http:\n  timeout_secs: 1\n").unwrap();
        assert_eq!(AppConfig::load_from_path(&path).unwrap().http.timeout_secs, 1);
    }
}
