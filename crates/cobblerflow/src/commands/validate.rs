use crate::utils;
use colored::Colorize;
use cobblerflow_core::Ensure;
use std::path::Path;

pub fn handle(file: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "宣言ファイルを検証中...".blue());

    match utils::load_systems(file) {
        Ok((path, systems)) => {
            utils::print_loaded_file(&path);
            println!("{}", "✓ 宣言ファイルは正常です！".green().bold());
            println!();
            println!("サマリー:");
            println!("  system: {}個", systems.len());
            for system in &systems {
                let profile = system.profile.as_deref().unwrap_or("(未設定)");
                let interfaces = system.interfaces.as_ref().map_or(0, |i| i.len());
                match system.ensure {
                    Ensure::Present => println!(
                        "    - {} ({}, {}個のインターフェース)",
                        system.name.cyan(),
                        profile,
                        interfaces
                    ),
                    Ensure::Absent => {
                        println!("    - {} ({})", system.name.cyan(), "absent".red())
                    }
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 宣言エラー".red().bold());
            eprintln!("  {:#}", e);
            std::process::exit(1);
        }
    }
}
