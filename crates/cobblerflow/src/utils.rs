use anyhow::Context;
use cobblerflow_cobbler::CobblerClient;
use cobblerflow_config::Settings;
use cobblerflow_core::DesiredSystem;
use cobblerflow_reconcile::Reconciler;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 宣言ファイルを探して読み込む
pub fn load_systems(file: Option<&Path>) -> anyhow::Result<(PathBuf, Vec<DesiredSystem>)> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => cobblerflow_config::find_systems_file()?,
    };
    let systems = cobblerflow_core::parse_kdl_file(&path)
        .with_context(|| format!("{} の読み込みに失敗しました", path.display()))?;
    tracing::debug!("Loaded {} systems from {}", systems.len(), path.display());
    Ok((path, systems))
}

/// 接続設定から Reconciler を組み立てる
pub fn connect() -> anyhow::Result<Reconciler> {
    let settings = Settings::load()?;
    tracing::debug!(
        "cobbler: {}, api: {}",
        settings.cobbler_bin.display(),
        settings.api_url
    );
    Ok(Reconciler::new(Arc::new(CobblerClient::from_settings(
        &settings,
    ))))
}

/// 読み込んだ宣言ファイルを表示
pub fn print_loaded_file(path: &Path) {
    println!("📄 {}", path.display().to_string().cyan());
}
