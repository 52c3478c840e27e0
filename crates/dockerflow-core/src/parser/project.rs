//! project / application ノードのパース

use super::{arguments, first_argument};
use crate::error::Result;
use crate::model::{Application, DockerExtension};
use kdl::KdlNode;
use std::path::PathBuf;

/// project ノードを適用
///
/// ```kdl
/// project "demo" version="1.0" build-dir="out"
/// ```
pub fn apply_project(ext: &mut DockerExtension, node: &KdlNode) -> Result<()> {
    if let Some(name) = first_argument(node) {
        ext.rename_project(name);
    }
    if let Some(version) = node.get("version").and_then(|v| v.as_string()) {
        ext.project.version = version.to_string();
    }
    if let Some(build_dir) = node.get("build-dir").and_then(|v| v.as_string()) {
        ext.project.build_dir = ext.project.resolve(build_dir);
    }
    Ok(())
}

/// application ノードをパース
///
/// 名前を省略した場合はプロジェクト名に従う（後の `project` ノードでの変更も反映される）。
pub fn parse_application(node: &KdlNode, project_name: &str) -> Application {
    let mut app = Application::new(project_name);
    if let Some(name) = first_argument(node) {
        app.name.set(name.to_string());
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "install-dir" => {
                    if let Some(dir) = first_argument(child) {
                        app.install_dir.set(PathBuf::from(dir));
                    }
                }
                "install-command" => {
                    app.install_command = arguments(child).map(str::to_string).collect();
                }
                other => {
                    tracing::debug!(node = other, "Skipping unknown application node");
                }
            }
        }
    }

    app
}
