use colored::Colorize;
use dockerflow_build::TaskGraph;
use dockerflow_core::{DockerExtension, LoadOptions};
use std::path::{Path, PathBuf};

/// ロード済みのプロジェクト
pub struct ProjectContext {
    pub root: PathBuf,
    pub ext: DockerExtension,
}

impl ProjectContext {
    /// 設定からタスクグラフを作成
    ///
    /// JVM規約はイメージの files を書き換えるため、複製した設定に適用します。
    pub fn task_graph(&self) -> anyhow::Result<TaskGraph> {
        let mut ext = self.ext.clone();
        Ok(dockerflow_build::build_task_graph(&mut ext)?)
    }
}

/// プロジェクトルートを決めて設定をロード
///
/// `--project-dir` が指定されていれば探索せずにそのディレクトリを使います。
pub fn resolve_project_root(project_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let root = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => dockerflow_core::find_project_root()?,
    };
    Ok(std::path::absolute(root)?)
}

pub fn load_context(
    project_dir: Option<&Path>,
    options: &LoadOptions,
) -> anyhow::Result<ProjectContext> {
    let root = resolve_project_root(project_dir)?;
    let ext = dockerflow_core::load_project_from_root(&root, options)?;
    Ok(ProjectContext { root, ext })
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_loaded_config_files(project_root: &Path) {
    let Ok(discovered) = dockerflow_core::discover_files(project_root) else {
        return;
    };

    println!("📄 読み込んだ設定ファイル:");
    if let Some(root) = &discovered.root {
        println!("  • {}", root.display().to_string().cyan());
    }
    if let Some(local) = &discovered.local_override {
        println!(
            "  • {} (ローカルオーバーライド)",
            local.display().to_string().cyan()
        );
    }
}
