//! ルート集約

use super::container::NamedContainer;
use super::image::{DockerImage, MAIN_IMAGE};
use super::project::Project;
use super::registry::RegistryContainer;
use crate::error::Result;
use serde::Serialize;

/// イメージのコレクション
///
/// `main` は常に解決可能な既定イメージです。
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ImageContainer {
    inner: NamedContainer<DockerImage>,
}

impl ImageContainer {
    pub fn register(&mut self, name: &str) -> Result<&mut DockerImage> {
        self.inner.register(name)
    }

    pub fn get_or_create(
        &mut self,
        name: &str,
        configure: impl FnOnce(&mut DockerImage),
    ) -> &mut DockerImage {
        self.inner.get_or_create(name, configure)
    }

    /// 既定イメージ `main`（なければ作成）
    pub fn main_mut(&mut self) -> &mut DockerImage {
        self.inner.get_or_create(MAIN_IMAGE, |_| {})
    }

    /// 既定イメージ `main`
    pub fn main(&self) -> Option<&DockerImage> {
        self.inner.get(MAIN_IMAGE)
    }

    pub fn get(&self, name: &str) -> Option<&DockerImage> {
        self.inner.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DockerImage> {
        self.inner.get_mut(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DockerImage> {
        self.inner.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.inner.names()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<'a> IntoIterator for &'a ImageContainer {
    type Item = &'a DockerImage;
    type IntoIter = std::slice::Iter<'a, DockerImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// dockerflow の設定全体
///
/// 1回の実行で1つだけ作成され、設定フェーズが終わった後は
/// 読み取り専用としてタスクグラフの展開に渡されます。
#[derive(Debug, Clone, Serialize)]
pub struct DockerExtension {
    pub project: Project,
    pub images: ImageContainer,
    pub registries: RegistryContainer,
}

impl DockerExtension {
    /// `main` イメージ（イメージ名 = プロジェクト名）を登録して作成
    pub fn new(project: Project) -> Self {
        let mut images = ImageContainer::default();
        let project_name = project.name.clone();
        images.get_or_create(MAIN_IMAGE, |image| {
            image.image_name.convention(project_name);
        });

        Self {
            project,
            images,
            registries: RegistryContainer::default(),
        }
    }

    /// プロジェクト名を変更（main のイメージ名規約も追従）
    pub fn rename_project(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.images.main_mut().image_name.convention(name.clone());
        if let Some(app) = &mut self.project.application {
            app.name.convention(name.clone());
        }
        self.project.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Named;

    #[test]
    fn test_main_image_is_registered_with_project_name() {
        let ext = DockerExtension::new(Project::named("demo", "/work/demo"));
        let main = ext.images.main().unwrap();
        assert_eq!(main.name(), "main");
        assert_eq!(main.resolved_image_name(), "demo");
        assert_eq!(ext.images.len(), 1);
        assert!(ext.registries.is_empty());
    }

    #[test]
    fn test_rename_project_follows_unless_explicit() {
        let mut ext = DockerExtension::new(Project::named("demo", "/work/demo"));
        ext.rename_project("renamed");
        assert_eq!(ext.images.main().unwrap().resolved_image_name(), "renamed");

        ext.images.main_mut().image_name.set("custom".to_string());
        ext.rename_project("again");
        assert_eq!(ext.images.main().unwrap().resolved_image_name(), "custom");
    }

    #[test]
    fn test_main_mut_is_lazy() {
        let mut images = ImageContainer::default();
        assert!(images.main().is_none());
        images.main_mut();
        images.main_mut();
        assert_eq!(images.names(), vec!["main"]);
    }
}
