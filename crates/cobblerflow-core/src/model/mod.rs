//! モデル定義
//!
//! Cobbler の system を表すデータモデルを定義します。

mod system;
mod value;

// Re-exports
pub use system::*;
pub use value::*;

/// インターフェース同期の間だけ使う一時インターフェース名
///
/// 宣言側で使うことはできません。
pub const PLACEHOLDER_INTERFACE: &str = "tmp_puppet";
