//! KDLパーサー
//!
//! system 宣言ファイル（systems.kdl）をパースします。

mod system;

pub use system::parse_system;

use crate::error::{FlowError, Result};
use crate::model::DesiredSystem;
use kdl::KdlDocument;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// KDLファイルをパースして宣言された system の一覧を生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Vec<DesiredSystem>> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| FlowError::IoError {
        path: path.as_ref().to_path_buf(),
        message: e.to_string(),
    })?;
    parse_kdl_string(&content)
}

/// KDL文字列をパース
///
/// system は宣言順に返されます。
pub fn parse_kdl_string(content: &str) -> Result<Vec<DesiredSystem>> {
    let doc: KdlDocument = content.parse()?;

    let mut systems = Vec::new();
    let mut seen = HashSet::new();

    for node in doc.nodes() {
        match node.name().value() {
            "system" => {
                let system = parse_system(node)?;
                system.validate()?;
                if !seen.insert(system.name.clone()) {
                    return Err(FlowError::DuplicateSystem(system.name));
                }
                systems.push(system);
            }
            other => {
                tracing::warn!("未知のトップレベルノードを無視します: {}", other);
            }
        }
    }

    tracing::debug!("{} 件の system 宣言を読み込みました", systems.len());
    Ok(systems)
}

#[cfg(test)]
mod tests;
