use crate::utils;
use cobblerflow_reconcile::{Action, ActionType, Plan};
use colored::Colorize;
use std::path::Path;

pub async fn handle(file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let (path, systems) = utils::load_systems(file)?;
    let reconciler = utils::connect()?;
    let plan = reconciler.plan(&systems).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    utils::print_loaded_file(&path);
    print_plan(&plan);
    Ok(())
}

pub fn print_plan(plan: &Plan) {
    println!();
    for action in &plan.actions {
        print_action(action);
    }
    println!();
    if plan.has_changes {
        println!("{} {}", "Plan:".bold(), plan.summary());
    } else {
        println!("{}", "変更はありません。宣言通りの状態です。".green());
    }
}

fn print_action(action: &Action) {
    let line = match action.action_type {
        ActionType::Create => format!("+ {}", action.system).green(),
        ActionType::Update => format!("~ {}", action.system).yellow(),
        ActionType::Delete => format!("- {}", action.system).red(),
        ActionType::NoOp => format!("  {}", action.system).dimmed(),
    };
    println!("{}", line);

    if let Some(changes) = action.details.get("changes").and_then(|c| c.as_array()) {
        for change in changes.iter().filter_map(|c| c.as_str()) {
            println!("    {}", change);
        }
    }
    if action.action_type == ActionType::Create
        && action.details.get("interfaces").and_then(|i| i.as_bool()) == Some(true)
    {
        println!("    interfaces");
    }
}
