use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub document_resource: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            document_resource: "companies".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading config file: {}", path.display()))?;
            toml::from_str::<Self>(&raw)
                .with_context(|| format!("failed parsing config file: {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("PLACEMENT_API_URL") {
            cfg.api_base_url = url;
        }
        if let Ok(token) = std::env::var("PLACEMENT_API_TOKEN") {
            cfg.api_token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Ok(timeout) = std::env::var("PLACEMENT_TIMEOUT_SECS") {
            cfg.request_timeout_secs = timeout.parse().unwrap_or(cfg.request_timeout_secs);
        }
        if let Ok(resource) = std::env::var("PLACEMENT_DOCUMENT_RESOURCE") {
            cfg.document_resource = resource;
        }
        if let Ok(format) = std::env::var("PLACEMENT_LOG_FORMAT") {
            if format.eq_ignore_ascii_case("json") {
                cfg.log_format = LogFormat::Json;
            } else if format.eq_ignore_ascii_case("text") {
                cfg.log_format = LogFormat::Text;
            }
        }

        cfg.api_base_url = cfg.api_base_url.trim_end_matches('/').to_string();
        cfg.document_resource = cfg.document_resource.trim_matches('/').to_string();
        if cfg.api_base_url.is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }
        if cfg.document_resource.is_empty() {
            anyhow::bail!("document_resource must not be empty");
        }
        tracing::debug!(
            api_base_url = %cfg.api_base_url,
            document_resource = %cfg.document_resource,
            "configuration loaded"
        );
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::{AppConfig, LogFormat};

    #[test]
    fn loads_default_when_file_missing() {
        let cfg = AppConfig::load(PathBuf::from("does-not-exist.toml").as_path()).expect("config");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.document_resource, "companies");
    }

    #[test]
    fn loads_toml_file_and_normalizes_urls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("placement.toml");
        fs::write(
            &path,
            "api_base_url='https://placements.example.edu/api/'\nrequest_timeout_secs=5\nlog_format='json'\n",
        )
        .expect("write");

        let cfg = AppConfig::load(path.as_path()).expect("config");
        assert_eq!(cfg.api_base_url, "https://placements.example.edu/api");
        assert_eq!(cfg.request_timeout_secs, 5);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.document_resource, "companies");
    }

    #[test]
    fn rejects_malformed_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("placement.toml");
        fs::write(&path, "request_timeout_secs = 'soon'\n").expect("write");

        let err = AppConfig::load(path.as_path()).expect_err("must fail");
        assert!(err.to_string().contains("failed parsing config file"));
    }
}
