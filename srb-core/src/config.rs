use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use srb_types::Scenario;
use thiserror::Error;

use crate::teleop::spacemouse::SpaceMouseSettings;

pub const NUCLEUS_ROOT_ENV: &str = "SRB_NUCLEUS_ROOT";
pub const HDRI_DIR_ENV: &str = "SRB_HDRI_DIR";

const FALLBACK_NUCLEUS_ROOT: &str = "omniverse://localhost/NVIDIA/Assets/Isaac/4.2/Isaac";
const FALLBACK_HDRI_DIR: &str = "assets/srb_assets/hdri";

static DEFAULT_ASSET_PATHS: Lazy<AssetPaths> = Lazy::new(|| AssetPaths {
    nucleus_root: std::env::var(NUCLEUS_ROOT_ENV)
        .unwrap_or_else(|_| FALLBACK_NUCLEUS_ROOT.to_owned()),
    hdri_dir: std::env::var_os(HDRI_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_HDRI_DIR)),
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where texture assets are resolved from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Remote asset server root, without a trailing slash
    pub nucleus_root: String,
    /// Local directory holding the sky HDRIs
    pub hdri_dir: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        DEFAULT_ASSET_PATHS.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub scenario: Scenario,
    pub assets: AssetPaths,
}

impl EnvironmentConfig {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            assets: AssetPaths::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    pub environment: EnvironmentConfig,
    pub spacemouse: SpaceMouseSettings,
}

impl TeleopConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        log::debug!("Loaded teleop config from {}", path.display());
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, time::Duration};

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = TeleopConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TeleopConfig::default());
        assert_eq!(config.environment.scenario, Scenario::Moon);
        assert_eq!(config.spacemouse.pos_sensitivity, 0.4);
        assert_eq!(config.spacemouse.rot_sensitivity, 0.8);
        assert_eq!(config.spacemouse.rate, 1000.0);
    }

    #[test]
    fn partial_config() {
        let config = TeleopConfig::from_json_str(
            r#"{
                "environment": { "scenario": "mars", "assets": { "hdri_dir": "/opt/hdri" } },
                "spacemouse": { "pos_sensitivity": 0.1, "read_timeout": { "secs": 0, "nanos": 5000000 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.environment.scenario, Scenario::Mars);
        assert_eq!(config.environment.assets.hdri_dir, PathBuf::from("/opt/hdri"));
        assert_eq!(
            config.environment.assets.nucleus_root,
            AssetPaths::default().nucleus_root
        );
        assert_eq!(config.spacemouse.pos_sensitivity, 0.1);
        assert_eq!(config.spacemouse.rot_sensitivity, 0.8);
        assert_eq!(config.spacemouse.read_timeout, Duration::from_millis(5));
    }

    #[test]
    fn environment_for_scenario() {
        let environment = EnvironmentConfig::new(Scenario::Mars);
        assert_eq!(environment.scenario, Scenario::Mars);
        assert_eq!(environment.assets, AssetPaths::default());

        let config = TeleopConfig::from_json_str(r#"{ "environment": { "scenario": "mars" } }"#)
            .unwrap();
        assert_eq!(config.environment, environment);
    }

    #[test]
    fn unknown_scenario_is_rejected() {
        let err = TeleopConfig::from_json_str(r#"{ "environment": { "scenario": "venus" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "environment": {{ "scenario": "orbit" }} }}"#).unwrap();

        let config = TeleopConfig::load(file.path()).unwrap();
        assert_eq!(config.environment.scenario, Scenario::Orbit);

        let err = TeleopConfig::load("/nonexistent/teleop.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
