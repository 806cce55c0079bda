//! インターフェース設定値

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// インターフェースごとの設定（設定名 → 値）
pub type InterfaceSettings = IndexMap<String, SettingValue>;

/// インターフェース名 → 設定
pub type Interfaces = IndexMap<String, InterfaceSettings>;

/// カーネルオプション（キー → 値）
pub type KernelOptions = IndexMap<String, String>;

/// インターフェース設定の値
///
/// Cobbler はスカラー値か、スカラー値のリストを返します。
/// `Null` は宣言側でのみ使われ、「この設定をクリアする」を意味します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    List(Vec<String>),
    Null,
}

impl SettingValue {
    /// 空文字列・空リスト・Null のいずれか
    pub fn is_empty(&self) -> bool {
        match self {
            SettingValue::Text(s) => s.is_empty(),
            SettingValue::List(items) => items.is_empty(),
            SettingValue::Null => true,
        }
    }

    /// コマンドラインに渡す形へ変換（リストは空白区切り）
    ///
    /// `Null` の場合は `None` を返します。
    pub fn to_flag_value(&self) -> Option<String> {
        match self {
            SettingValue::Text(s) => Some(s.clone()),
            SettingValue::List(items) => Some(items.join(" ")),
            SettingValue::Null => None,
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

/// 文字列を真偽値として解釈
///
/// 空文字列と `false` / `0` / `no` / `off`（大文字小文字は無視）以外は真。
pub fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "no" | "off"
    )
}
