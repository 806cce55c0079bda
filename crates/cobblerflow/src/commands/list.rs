use crate::utils;
use colored::Colorize;

pub async fn handle(json: bool) -> anyhow::Result<()> {
    let reconciler = utils::connect()?;
    let systems = reconciler.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&systems)?);
        return Ok(());
    }

    if systems.is_empty() {
        println!("{}", "system は登録されていません".dimmed());
        return Ok(());
    }

    println!(
        "{:<24} {:<28} {:<8} {}",
        "NAME".bold(),
        "PROFILE".bold(),
        "NETBOOT".bold(),
        "INTERFACES".bold()
    );
    for system in &systems {
        let interfaces: Vec<&str> = system.interfaces.keys().map(String::as_str).collect();
        let netboot = if system.netboot { "yes".green() } else { "no".dimmed() };
        println!(
            "{:<24} {:<28} {:<8} {}",
            system.name.cyan(),
            system.profile.as_deref().unwrap_or("-"),
            netboot,
            interfaces.join(", ")
        );
    }
    Ok(())
}
