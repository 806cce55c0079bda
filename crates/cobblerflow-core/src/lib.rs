//! cobblerflow core
//!
//! Cobbler の system 定義（望ましい状態）と、Cobbler から読み出した実際の状態を
//! 表すデータモデル、および KDL 宣言ファイルのパーサーを提供します。

pub mod error;
pub mod model;
pub mod parser;

pub use error::*;
pub use model::*;
pub use parser::*;
