use crate::docker;
use crate::utils::{self, ProjectContext};
use colored::Colorize;
use dockerflow_build::{Executor, TaskOutcome};

pub async fn handle(
    ctx: &ProjectContext,
    targets: &[String],
    dry_run: bool,
    no_preflight: bool,
) -> anyhow::Result<()> {
    let graph = ctx.task_graph()?;

    utils::print_loaded_config_files(&ctx.root);
    println!();

    if !dry_run && !no_preflight {
        let plan = graph.execution_order(targets)?;
        if docker::plan_uses_docker(&plan) {
            docker::preflight().await?;
        }
    }

    if dry_run {
        println!("{}", "実行計画（dry-run）:".bold());
    }

    let report = Executor::new(&ctx.root)
        .dry_run(dry_run)
        .run(&graph, targets)
        .await?;

    println!();
    if dry_run {
        println!("{} {}個のタスクを実行予定", "ℹ".cyan(), report.tasks.len());
        return Ok(());
    }

    let ignored = report
        .tasks
        .iter()
        .filter(|(_, outcome)| matches!(outcome, TaskOutcome::IgnoredFailure { .. }))
        .count();
    println!(
        "{} {}",
        "✓".green(),
        format!("{}個のタスクが完了しました", report.tasks.len()).green().bold()
    );
    if ignored > 0 {
        println!(
            "  {} {}個のタスクは終了コードを無視しました",
            "⚠".yellow(),
            ignored
        );
    }
    Ok(())
}
