use crate::utils;
use colored::Colorize;
use dockerflow_core::{LoadOptions, Named};
use std::path::Path;

pub fn handle(project_dir: Option<&Path>, options: &LoadOptions) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let project_root = match utils::resolve_project_root(project_dir) {
        Ok(root) => root,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ プロジェクトルートが見つかりません".red().bold());
            eprintln!("  {}", e);
            eprintln!();
            eprintln!("docker.kdl が存在するディレクトリで実行してください");
            std::process::exit(1);
        }
    };
    println!(
        "プロジェクトルート: {}",
        project_root.display().to_string().cyan()
    );

    let ctx = match utils::load_context(Some(&project_root), options) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {:#}", e);
            std::process::exit(1);
        }
    };

    // 名前の衝突などはタスクグラフの展開時に検出される
    let graph = match ctx.task_graph() {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ タスクを展開できません".red().bold());
            match e.downcast_ref::<dockerflow_build::BuildError>() {
                Some(build_error) => eprintln!("  {}", build_error.user_message()),
                None => eprintln!("  {:#}", e),
            }
            std::process::exit(1);
        }
    };

    let ext = &ctx.ext;
    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!(
        "  プロジェクト: {} (version {})",
        ext.project.name.cyan(),
        ext.project.version
    );
    if let Some(app) = &ext.project.application {
        println!(
            "  アプリケーション: {} ({})",
            app.resolved_name().cyan(),
            app.resolved_install_dir().display()
        );
    }
    println!("  イメージ: {}個", ext.images.len());
    for image in &ext.images {
        println!(
            "    - {} ({})",
            image.name().cyan(),
            image.base_tag(&ext.project.version)
        );
    }
    println!("  レジストリ: {}個", ext.registries.len());
    for registry in &ext.registries {
        println!("    - {} ({})", registry.name().cyan(), registry.prefix());
    }
    println!("  タスク: {}個", graph.len());

    Ok(())
}
