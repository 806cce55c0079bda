pub mod error;
mod settings;

pub use error::*;
pub use settings::*;

use std::path::PathBuf;

/// 宣言ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "COBBLERFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["systems.local.kdl", "systems.kdl"];

/// cobblerflowの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("cobblerflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// system 宣言ファイル（systems.kdl）を探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 COBBLERFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: systems.local.kdl, systems.kdl
/// 3. ./.cobblerflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/cobblerflow/systems.kdl (グローバル設定)
pub fn find_systems_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} が存在しません: {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.cobblerflow/ ディレクトリで検索
    let flow_dir = current_dir.join(".cobblerflow");
    if flow_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = flow_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("cobblerflow").join("systems.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::SystemsFileNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("cobblerflow"));
        assert!(config_dir.exists());
    }

    #[test]
    #[serial]
    fn test_find_systems_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("systems.kdl"), "// test").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_systems_file();

        std::env::set_current_dir(original_dir).unwrap();
        assert!(result.unwrap().ends_with("systems.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_systems_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("systems.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("systems.local.kdl"), "// local").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_systems_file();

        std::env::set_current_dir(original_dir).unwrap();
        // systems.local.kdl が優先される
        assert!(result.unwrap().ends_with("systems.local.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_systems_file_in_flow_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let flow_dir = temp_dir.path().join(".cobblerflow");
        fs::create_dir(&flow_dir).unwrap();
        fs::write(flow_dir.join("systems.kdl"), "// in flow dir").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_systems_file();

        std::env::set_current_dir(original_dir).unwrap();
        assert!(result.unwrap().ends_with(".cobblerflow/systems.kdl"));
    }

    #[test]
    #[serial]
    fn test_find_systems_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        let result = temp_env::with_var(CONFIG_PATH_ENV, Some(&config_path), find_systems_file);
        assert_eq!(result.unwrap(), config_path);
    }
}
