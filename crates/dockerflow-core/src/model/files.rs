//! ビルドコンテキストのコピー仕様

use serde::Serialize;
use std::path::PathBuf;

/// ビルドコンテキストに含めるファイル群
///
/// KDL形式：
/// ```kdl
/// files {
///     from "docker"
///     from "build/libs/app.jar" rename="app.jar"
///     from "config" {
///         include "*.yml"
///         exclude "secret*"
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSpec {
    pub sources: Vec<CopySource>,
}

impl FileSpec {
    /// コピー元を追加（既存の指定に重ねる）
    pub fn from(&mut self, source: CopySource) -> &mut Self {
        self.sources.push(source);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// コピー元を生成するタスク名（重複なし、宣言順）
    pub fn producers(&self) -> Vec<&str> {
        let mut producers: Vec<&str> = Vec::new();
        for name in self.sources.iter().filter_map(|s| s.produced_by.as_deref()) {
            if !producers.contains(&name) {
                producers.push(name);
            }
        }
        producers
    }
}

/// コピー元の1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopySource {
    /// コピー元パス（プロジェクトルートからの相対パス）
    pub from: PathBuf,
    /// ファイルをコピーする場合の別名
    pub rename: Option<String>,
    /// ディレクトリ内で含めるファイルのglobパターン（空なら全て）
    pub include: Vec<String>,
    /// ディレクトリ内で除外するファイルのglobパターン
    pub exclude: Vec<String>,
    /// このコピー元を生成するタスク
    pub produced_by: Option<String>,
}

impl CopySource {
    pub fn new(from: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            rename: None,
            include: Vec::new(),
            exclude: Vec::new(),
            produced_by: None,
        }
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn produced_by(mut self, task: impl Into<String>) -> Self {
        self.produced_by = Some(task.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_is_layered() {
        let mut spec = FileSpec::default();
        spec.from(CopySource::new("docker"))
            .from(CopySource::new("build/app.jar").rename("app.jar"));

        assert_eq!(spec.sources.len(), 2);
        assert_eq!(spec.sources[1].rename.as_deref(), Some("app.jar"));
    }

    #[test]
    fn test_producers_are_deduplicated() {
        let mut spec = FileSpec::default();
        spec.from(CopySource::new("a").produced_by("installDist"))
            .from(CopySource::new("b"))
            .from(CopySource::new("c").produced_by("createMainJvmAppDockerfile"))
            .from(CopySource::new("d").produced_by("installDist"));

        assert_eq!(
            spec.producers(),
            vec!["installDist", "createMainJvmAppDockerfile"]
        );
    }
}
