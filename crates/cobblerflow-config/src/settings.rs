//! Cobbler への接続設定
//!
//! `~/.config/cobblerflow/config.yaml` を読み込み、環境変数で上書きします。

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const COBBLER_BIN_ENV: &str = "COBBLER_BIN";
pub const COBBLER_API_URL_ENV: &str = "COBBLER_API_URL";
pub const TIMEOUT_ENV: &str = "COBBLERFLOW_TIMEOUT_SECS";

const SETTINGS_FILE: &str = "config.yaml";

/// 接続設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// cobbler 実行ファイル
    pub cobbler_bin: PathBuf,

    /// XML-RPC エンドポイント
    pub api_url: String,

    /// リモート呼び出し 1 回あたりのタイムアウト（秒）
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cobbler_bin: PathBuf::from("/usr/bin/cobbler"),
            api_url: "http://127.0.0.1/cobbler_api".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// グローバル設定ファイルと環境変数から読み込む
    ///
    /// 設定ファイルがなければデフォルト値を使います。
    pub fn load() -> Result<Self> {
        let mut settings = match dirs::config_dir() {
            Some(dir) => {
                let path = dir.join("cobblerflow").join(SETTINGS_FILE);
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Self::default()
                }
            }
            None => Self::default(),
        };
        settings.apply_env()?;
        Ok(settings)
    }

    /// 指定した YAML ファイルから読み込む（環境変数は適用しない）
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidSettings {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// 環境変数で上書き
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(bin) = std::env::var(COBBLER_BIN_ENV) {
            self.cobbler_bin = PathBuf::from(bin);
        }
        if let Ok(url) = std::env::var(COBBLER_API_URL_ENV) {
            self.api_url = url;
        }
        if let Ok(value) = std::env::var(TIMEOUT_ENV) {
            self.timeout_secs = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: TIMEOUT_ENV.to_string(),
                value,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cobbler_bin, PathBuf::from("/usr/bin/cobbler"));
        assert_eq!(settings.api_url, "http://127.0.0.1/cobbler_api");
        assert_eq!(settings.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_load_from_partial_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "api_url: http://cobbler.lan/cobbler_api\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.api_url, "http://cobbler.lan/cobbler_api");
        // 未指定の項目はデフォルト
        assert_eq!(settings.timeout_secs, 120);
    }

    #[test]
    fn test_load_from_invalid_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "timeout_secs: [1, 2]\n").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::InvalidSettings { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                (COBBLER_BIN_ENV, Some("/opt/cobbler/bin/cobbler")),
                (COBBLER_API_URL_ENV, Some("http://10.0.0.2/cobbler_api")),
                (TIMEOUT_ENV, Some("30")),
            ],
            || {
                let mut settings = Settings::default();
                settings.apply_env().unwrap();
                assert_eq!(
                    settings.cobbler_bin,
                    PathBuf::from("/opt/cobbler/bin/cobbler")
                );
                assert_eq!(settings.api_url, "http://10.0.0.2/cobbler_api");
                assert_eq!(settings.timeout(), Duration::from_secs(30));
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env() {
        temp_env::with_var(TIMEOUT_ENV, Some("soon"), || {
            let mut settings = Settings::default();
            match settings.apply_env() {
                Err(ConfigError::InvalidEnv { key, value }) => {
                    assert_eq!(key, TIMEOUT_ENV);
                    assert_eq!(value, "soon");
                }
                other => panic!("Expected InvalidEnv, got {:?}", other),
            }
        });
    }
}
