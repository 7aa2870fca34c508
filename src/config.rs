use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::GfetchError;

pub const DEFAULT_CONFIG_FILE: &str = "gfetch.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub endpoint: String,
    pub manifest_path: String,
    pub base_dir: String,
    pub header_skip: usize,
    pub sequence_column: String,
    pub sequence_extension: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "https://ftp.ncbi.nlm.nih.gov".to_string(),
            manifest_path: "/genomes/GENOME_REPORTS/prokaryotes.txt".to_string(),
            base_dir: "genomes/ASSEMBLY_BACTERIA".to_string(),
            header_skip: 10,
            sequence_column: "Chromosomes/RefSeq".to_string(),
            sequence_extension: ".fna".to_string(),
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<Config, GfetchError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using built-in defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| GfetchError::ConfigRead(config_path.clone()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Config, GfetchError> {
        let config: Config =
            serde_json::from_str(content).map_err(|err| GfetchError::ConfigParse(err.to_string()))?;
        if config.sequence_column.trim().is_empty() {
            return Err(GfetchError::ConfigParse(
                "sequence_column must not be empty".to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(r#"{"header_skip": 0}"#).unwrap();
        assert_eq!(config.header_skip, 0);
        assert_eq!(config.base_dir, "genomes/ASSEMBLY_BACTERIA");
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = ConfigLoader::parse(r#"{"endpoint_url": "x"}"#).unwrap_err();
        assert_matches!(err, GfetchError::ConfigParse(_));
    }
}
