use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("system '{0}' が重複して定義されています")]
    DuplicateSystem(String),

    #[error("system '{system}': インターフェース名 '{interface}' は予約されています")]
    ReservedInterface { system: String, interface: String },

    #[error("system '{0}': interfaces を宣言する場合は設定を持つインターフェースが 1 つ以上必要です")]
    NoInterfaces(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
