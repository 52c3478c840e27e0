use colored::Colorize;
use dockerflow_build::{Task, TaskAction};

/// 実行計画に docker CLI を起動するタスクが含まれるか
pub fn plan_uses_docker(plan: &[&Task]) -> bool {
    plan.iter().any(|task| {
        matches!(
            &task.action,
            TaskAction::Exec { executable, .. } if executable == "docker"
        )
    })
}

/// Docker デーモンへの接続確認（エラーハンドリング付き）
pub async fn preflight() -> anyhow::Result<()> {
    let result = match bollard::Docker::connect_with_local_defaults() {
        Ok(docker) => docker.ping().await.map(|_| ()),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            tracing::debug!("Docker daemon is reachable");
            Ok(())
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ Docker接続エラー".red().bold());
            eprintln!();
            eprintln!("{}", "原因:".yellow());
            eprintln!("  {}", e);
            eprintln!();
            eprintln!("{}", "解決方法:".yellow());
            eprintln!("  • Dockerが起動しているか確認してください");
            eprintln!("  • docker ps コマンドが正常に動作するか確認してください");
            eprintln!("  • 接続確認を省略する場合は --no-preflight を指定してください");
            Err(anyhow::anyhow!("Docker接続に失敗しました"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_uses_docker() {
        let build = Task::new(
            "dockerBuildMain",
            TaskAction::docker(vec!["build".to_string(), ".".to_string()]),
        );
        let install = Task::new(
            "installDist",
            TaskAction::Exec {
                executable: "./gradlew".to_string(),
                args: vec!["installDist".to_string()],
                ignore_exit_value: false,
            },
        );
        let collector = Task::lifecycle("dockerBuild");

        assert!(plan_uses_docker(&[&install, &build, &collector]));
        assert!(!plan_uses_docker(&[&install, &collector]));
    }
}
