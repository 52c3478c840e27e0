use crate::utils::ProjectContext;
use colored::Colorize;
use dockerflow_build::{Task, TaskAction};

pub fn handle(ctx: &ProjectContext, targets: &[String], json: bool) -> anyhow::Result<()> {
    let graph = ctx.task_graph()?;
    let order = graph.execution_order(targets)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&order)?);
        return Ok(());
    }

    println!(
        "{} {} ({}タスク)",
        "実行計画:".bold(),
        targets.join(", ").cyan(),
        order.len()
    );
    for (i, task) in order.iter().enumerate() {
        println!("{:>3}. {}", i + 1, task.name.green());
        if let Some(detail) = describe(task) {
            println!("       {}", detail.dimmed());
        }
    }
    Ok(())
}

/// 計画表示用の処理内容
fn describe(task: &Task) -> Option<String> {
    match &task.action {
        TaskAction::Lifecycle => None,
        TaskAction::Sync { sources, into } => Some(format!(
            "sync {} -> {}",
            sources
                .iter()
                .map(|s| s.from.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            into.display()
        )),
        TaskAction::WriteFile { path, .. } => Some(format!("write {}", path.display())),
        action @ TaskAction::Exec {
            ignore_exit_value, ..
        } => action.display_command().map(|command| {
            if *ignore_exit_value {
                format!("{} (exit code ignored)", command)
            } else {
                command
            }
        }),
    }
}
