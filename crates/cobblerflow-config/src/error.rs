use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "宣言ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: systems.local.kdl, systems.kdl\n\
        - ./.cobblerflow/ ディレクトリ\n\
        - ~/.config/cobblerflow/systems.kdl\n\
        または COBBLERFLOW_CONFIG_PATH 環境変数で直接指定できます"
    )]
    SystemsFileNotFound,

    #[error("設定ファイルの読み込みに失敗しました: {path}\n理由: {message}")]
    InvalidSettings { path: PathBuf, message: String },

    #[error("環境変数 {key} の値が不正です: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
