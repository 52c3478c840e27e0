//! 統合ローダー
//!
//! ファイル発見とパースを統合し、`DockerExtension` を組み立てます。

use crate::discovery::{discover_files, find_project_root};
use crate::error::Result;
use crate::model::{DockerExtension, Project};
use crate::parser::apply_kdl_file;
use std::path::Path;
use tracing::{debug, info, instrument};

/// 設定ファイル以外から与えられる上書き値
///
/// CLI では `--image-version` / `IMAGE_VERSION` と
/// `--repository-owner` / `REPOSITORY_OWNER` から埋められます。
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// main イメージのバージョン
    pub image_version: Option<String>,
    /// 引数なしの github-container-registry に使うユーザー名
    pub repository_owner: Option<String>,
}

/// プロジェクトルートを検出してロード
#[instrument(skip(options))]
pub fn load_project(options: &LoadOptions) -> Result<DockerExtension> {
    info!("Starting project load");
    let project_root = find_project_root()?;
    load_project_from_root(&project_root, options)
}

/// 指定されたルートディレクトリからプロジェクトをロード
///
/// 読み込み順序: docker.kdl → docker.local.kdl → `LoadOptions`
#[instrument(skip(project_root, options), fields(project_root = %project_root.display()))]
pub fn load_project_from_root(project_root: &Path, options: &LoadOptions) -> Result<DockerExtension> {
    debug!("Step 1: Discovering files");
    let discovered = discover_files(project_root)?;

    debug!("Step 2: Applying config files");
    let mut ext = DockerExtension::new(Project::new(project_root));
    for file in discovered.in_order() {
        apply_kdl_file(&mut ext, file, options)?;
    }

    debug!("Step 3: Applying overrides");
    apply_overrides(&mut ext, options);

    info!(
        project = %ext.project.name,
        images = ext.images.len(),
        registries = ext.registries.len(),
        "Project loaded successfully"
    );
    Ok(ext)
}

/// 設定ファイルより優先される値を適用
pub fn apply_overrides(ext: &mut DockerExtension, options: &LoadOptions) {
    if let Some(version) = &options.image_version {
        debug!(version = %version, "Overriding main image version");
        ext.images.main_mut().image_version.set(version.clone());
    }
}
