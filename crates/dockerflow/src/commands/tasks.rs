use crate::utils::ProjectContext;
use colored::Colorize;
use dockerflow_build::{Task, TaskGraph, TaskGroup};
use std::collections::BTreeMap;

pub fn handle(ctx: &ProjectContext, all: bool) -> anyhow::Result<()> {
    let graph = ctx.task_graph()?;

    println!(
        "{} {}",
        "プロジェクト:".bold(),
        ctx.ext.project.name.cyan()
    );

    for (group, tasks) in grouped(&graph, all) {
        let title = match group {
            Some(group) => format!("{} tasks", capitalize(&group.to_string())),
            None => "Other tasks".to_string(),
        };
        println!();
        println!("{}", title.bold());
        println!("{}", "-".repeat(title.len()));
        for task in tasks {
            match &task.description {
                Some(description) => println!("{} - {}", task.name.green(), description),
                None => println!("{}", task.name.green()),
            }
        }
    }

    if !all {
        println!();
        println!("{}", "グループ外のタスクも表示するには --all を指定してください".dimmed());
    }
    Ok(())
}

/// グループごとのタスク（グループ順でグループ外は最後、グループ内は名前順）
fn grouped(graph: &TaskGraph, all: bool) -> Vec<(Option<TaskGroup>, Vec<&Task>)> {
    let mut groups: BTreeMap<(bool, Option<TaskGroup>), Vec<&Task>> = BTreeMap::new();
    for task in graph.tasks() {
        if task.group.is_none() && !all {
            continue;
        }
        groups
            .entry((task.group.is_none(), task.group))
            .or_default()
            .push(task);
    }
    groups
        .into_iter()
        .map(|((_, group), mut tasks)| {
            tasks.sort_by(|a, b| a.name.cmp(&b.name));
            (group, tasks)
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
