//! 設定ファイルの発見
//!
//! プロジェクトルートと、そこに置かれた docker.kdl / docker.local.kdl を探します。

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// プロジェクトルートを指定する環境変数
pub const PROJECT_ROOT_ENV: &str = "DOCKERFLOW_PROJECT_ROOT";

/// ルート設定ファイル名
pub const ROOT_FILE: &str = "docker.kdl";

/// ローカルオーバーライドファイル名（VCS管理外を想定）
pub const LOCAL_OVERRIDE_FILE: &str = "docker.local.kdl";

/// 設定ファイルを置ける隠しディレクトリ
pub const CONFIG_DIR: &str = ".dockerflow";

/// 発見されたファイル群
#[derive(Debug, Clone, Default)]
pub struct DiscoveredFiles {
    /// ルートファイル (docker.kdl)
    pub root: Option<PathBuf>,
    /// ローカルオーバーライドファイル (docker.local.kdl)
    pub local_override: Option<PathBuf>,
}

impl DiscoveredFiles {
    /// 適用順のファイル一覧
    pub fn in_order(&self) -> impl Iterator<Item = &PathBuf> {
        self.root.iter().chain(self.local_override.iter())
    }
}

/// プロジェクトルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 DOCKERFLOW_PROJECT_ROOT
/// 2. カレントディレクトリから上に向かって以下を探す:
///    - docker.kdl
///    - .dockerflow/docker.kdl
#[tracing::instrument]
pub fn find_project_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var(PROJECT_ROOT_ENV) {
        let path = PathBuf::from(&root);
        debug!(env_root = %root, "Checking DOCKERFLOW_PROJECT_ROOT");
        if has_root_file(&path) {
            info!(project_root = %path.display(), "Found project root from environment variable");
            return Ok(path);
        }
        warn!(env_root = %root, "DOCKERFLOW_PROJECT_ROOT has no docker.kdl, falling back to search");
    }

    let start_dir = std::env::current_dir()?;
    find_project_root_from(&start_dir)
}

/// 指定ディレクトリから上に向かってプロジェクトルートを検索
#[tracing::instrument(skip(start_dir), fields(start_dir = %start_dir.display()))]
pub fn find_project_root_from(start_dir: &Path) -> Result<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        debug!(checking = %current.display(), "Looking for docker.kdl");
        if has_root_file(&current) {
            info!(project_root = %current.display(), "Found project root");
            return Ok(current);
        }

        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Project root not found");
    Err(ConfigError::ProjectRootNotFound(start_dir.to_path_buf()))
}

fn has_root_file(dir: &Path) -> bool {
    dir.join(ROOT_FILE).exists() || dir.join(CONFIG_DIR).join(ROOT_FILE).exists()
}

/// プロジェクトルートからファイルを発見
///
/// ルート直下のファイルを `.dockerflow/` 内のものより優先します。
#[tracing::instrument(skip(project_root), fields(project_root = %project_root.display()))]
pub fn discover_files(project_root: &Path) -> Result<DiscoveredFiles> {
    let discovered = DiscoveredFiles {
        root: first_existing(project_root, ROOT_FILE),
        local_override: first_existing(project_root, LOCAL_OVERRIDE_FILE),
    };

    if discovered.root.is_none() {
        return Err(ConfigError::ProjectRootNotFound(project_root.to_path_buf()));
    }

    debug!(
        root = ?discovered.root,
        local_override = ?discovered.local_override,
        "File discovery complete"
    );
    Ok(discovered)
}

fn first_existing(project_root: &Path, file_name: &str) -> Option<PathBuf> {
    [
        project_root.join(file_name),
        project_root.join(CONFIG_DIR).join(file_name),
    ]
    .into_iter()
    .find(|path| path.exists())
}
