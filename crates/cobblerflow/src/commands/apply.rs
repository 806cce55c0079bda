use crate::utils;
use cobblerflow_reconcile::{PassLock, PassReport};
use colored::Colorize;
use std::path::Path;

pub async fn handle(file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let (path, systems) = utils::load_systems(file)?;
    let reconciler = utils::connect()?;

    // 同じプロジェクトで apply が重ならないようにロック
    let project_root = std::env::current_dir()?;
    let lock = PassLock::acquire(&project_root).await?;

    if !json {
        utils::print_loaded_file(&path);
        println!("{}", "Cobbler に適用中...".blue());
    }
    let result = reconciler.apply(&systems).await;
    lock.release().await?;
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{}個の system の適用に失敗しました",
            report.failed.len() + usize::from(report.sync_error.is_some())
        );
    }
    Ok(())
}

fn print_report(report: &PassReport) {
    println!();
    for result in &report.succeeded {
        println!(
            "  {} {} ({})",
            "✓".green(),
            result.system.cyan(),
            result.message
        );
    }
    for result in &report.failed {
        println!(
            "  {} {} [{}]",
            "✗".red(),
            result.system.cyan(),
            result.action
        );
        if let Some(error) = &result.error {
            println!("      {}", error.red());
        }
    }

    println!();
    if report.synced {
        println!("{}", "✓ cobbler sync 完了".green());
    } else if let Some(error) = &report.sync_error {
        println!("{}", "✗ cobbler sync に失敗しました".red().bold());
        println!("      {}", error);
    }
    println!(
        "{} 件変更, {} 件失敗 ({}ms)",
        report.changed(),
        report.failed.len(),
        report.duration_ms
    );
}
