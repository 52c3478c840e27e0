//! プロジェクト定義

use super::property::Property;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// プロジェクトのバージョンが未指定の場合の値
pub const UNSPECIFIED_VERSION: &str = "unspecified";

/// ビルド対象プロジェクト
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    /// プロジェクト名（main イメージ名と Dockerfile 名に使用）
    pub name: String,
    /// プロジェクト共通のバージョン（イメージバージョンのフォールバック）
    pub version: String,
    /// プロジェクトルート
    pub root: PathBuf,
    /// ビルド出力ディレクトリ（既定: `<root>/build`）
    pub build_dir: PathBuf,
    /// application 規約（JVMアプリケーション）
    pub application: Option<Application>,
}

impl Project {
    /// ルートディレクトリ名をプロジェクト名として作成
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Self::named(name, root)
    }

    pub fn named(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: name.into(),
            version: UNSPECIFIED_VERSION.to_string(),
            build_dir: root.join("build"),
            root,
            application: None,
        }
    }

    /// application 規約が有効か
    pub fn is_application(&self) -> bool {
        self.application.is_some()
    }

    /// ルートからの相対パスを解決（絶対パスはそのまま）
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// application 規約
///
/// KDL形式：
/// ```kdl
/// application "demo" {
///     install-dir "build/install/demo"
///     install-command "./gradlew" "installDist"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    /// アプリケーション名（起動スクリプト名）。規約値はプロジェクト名
    pub name: Property<String>,
    /// 配布物（bin/, lib/）のディレクトリ（プロジェクトルートからの相対パス）
    pub install_dir: Property<PathBuf>,
    /// 配布物を生成するコマンド（空なら生成済みとみなす）
    pub install_command: Vec<String>,
}

impl Application {
    /// `project_name` を名前の規約値とするアプリケーション
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            name: Property::with_convention(project_name.into()),
            install_dir: Property::default(),
            install_command: Vec::new(),
        }
    }

    /// 解決済みのアプリケーション名
    pub fn resolved_name(&self) -> &str {
        self.name.get().map_or("", String::as_str)
    }

    /// 解決済みの配布物ディレクトリ（既定: `build/install/<name>`）
    pub fn resolved_install_dir(&self) -> PathBuf {
        self.install_dir
            .get_or_else(|| PathBuf::from(format!("build/install/{}", self.resolved_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_defaults() {
        let project = Project::new("/work/demo");
        assert_eq!(project.name, "demo");
        assert_eq!(project.version, UNSPECIFIED_VERSION);
        assert_eq!(project.build_dir, PathBuf::from("/work/demo/build"));
        assert!(!project.is_application());
    }

    #[test]
    fn test_project_resolve() {
        let project = Project::named("demo", "/work/demo");
        assert_eq!(project.resolve("docker"), PathBuf::from("/work/demo/docker"));
        assert_eq!(project.resolve("/opt/x"), PathBuf::from("/opt/x"));
    }

    #[test]
    fn test_application_default_install_dir() {
        let app = Application::new("demo");
        assert_eq!(app.resolved_name(), "demo");
        assert_eq!(app.resolved_install_dir(), PathBuf::from("build/install/demo"));
        assert!(app.install_command.is_empty());
    }

    #[test]
    fn test_application_install_dir_follows_name() {
        let mut app = Application::new("demo");
        app.name.convention("shop".to_string());
        assert_eq!(app.resolved_install_dir(), PathBuf::from("build/install/shop"));

        app.name.set("server".to_string());
        app.name.convention("other".to_string());
        assert_eq!(app.resolved_name(), "server");
        assert_eq!(app.resolved_install_dir(), PathBuf::from("build/install/server"));

        app.install_dir.set(PathBuf::from("dist"));
        assert_eq!(app.resolved_install_dir(), PathBuf::from("dist"));
    }
}
