//! レジストリ定義

use super::container::{Named, NamedContainer};
use super::property::Property;
use crate::error::{ConfigError, Result};
use crate::naming::ensure_trailing_slash;
use serde::Serialize;

/// コンテナレジストリ
///
/// KDL形式：
/// ```kdl
/// registry "local" {
///     image-tag-prefix "localhost:5000"
///     url "localhost:5000"
///     username "admin"
///     password-env "LOCAL_REGISTRY_PASSWORD"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct DockerRegistry {
    name: String,
    /// イメージタグの前に付けるプレフィックス（例: `ghcr.io/user`）
    pub image_tag_prefix: Property<String>,
    /// `docker login` 先
    pub url: Option<String>,
    pub username: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
    /// パスワードを読む環境変数名
    pub password_env: Option<String>,
}

impl Named for DockerRegistry {
    const KIND: &'static str = "レジストリ";

    fn create(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image_tag_prefix: Property::default(),
            url: None,
            username: None,
            password: None,
            password_env: None,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl DockerRegistry {
    /// 末尾 `/` 付きのタグプレフィックス
    ///
    /// 未設定の場合は空文字列。タスク展開前に [`Self::require_prefix`] で検査される。
    pub fn prefix(&self) -> String {
        match self.image_tag_prefix.get() {
            Some(prefix) if !prefix.is_empty() => ensure_trailing_slash(prefix),
            _ => String::new(),
        }
    }

    /// プレフィックスが設定されていなければエラー
    ///
    /// プレフィックスなしのタグは公式ライブラリへの push になってしまうため拒否する。
    pub fn require_prefix(&self) -> Result<String> {
        let prefix = self.prefix();
        if prefix.is_empty() {
            return Err(ConfigError::InvalidConfig(format!(
                "レジストリ '{}' に image-tag-prefix が設定されていません",
                self.name
            )));
        }
        Ok(prefix)
    }

    /// プレフィックス付きのタグ
    pub fn qualify(&self, tag: &str) -> String {
        format!("{}{}", self.prefix(), tag)
    }

    /// ログイン用パスワード（明示値 > 環境変数）
    pub fn login_password(&self) -> Option<String> {
        self.password.clone().or_else(|| {
            self.password_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
        })
    }
}

/// レジストリのコレクション
///
/// よく使われるレジストリ用のショートカットを提供します。
/// ショートカットを繰り返し呼ぶと既存のエントリが更新されます。
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RegistryContainer {
    inner: NamedContainer<DockerRegistry>,
}

impl RegistryContainer {
    pub const DOCKER_HUB: &'static str = "dockerHub";
    pub const AMAZON_ECR: &'static str = "amazonEcr";
    pub const GITHUB_CONTAINER_REGISTRY: &'static str = "ghcr";
    pub const GOOGLE_ARTIFACT_REGISTRY: &'static str = "googleArtifactRegistry";

    pub fn register(&mut self, name: &str) -> Result<&mut DockerRegistry> {
        self.inner.register(name)
    }

    pub fn get_or_create(
        &mut self,
        name: &str,
        configure: impl FnOnce(&mut DockerRegistry),
    ) -> &mut DockerRegistry {
        self.inner.get_or_create(name, configure)
    }

    /// Docker Hub（プレフィックス: ユーザー名）
    pub fn docker_hub(&mut self, username: &str) -> &mut DockerRegistry {
        self.get_or_create(Self::DOCKER_HUB, |registry| {
            registry.image_tag_prefix.set(username.to_string());
            registry.url.get_or_insert_with(|| "docker.io".to_string());
        })
    }

    /// Amazon ECR（プレフィックス: `<account>.dkr.ecr.<region>.amazonaws.com`）
    pub fn amazon_ecr(&mut self, account_id: &str, region: &str) -> &mut DockerRegistry {
        let host = format!("{}.dkr.ecr.{}.amazonaws.com", account_id, region);
        self.get_or_create(Self::AMAZON_ECR, |registry| {
            registry.image_tag_prefix.set(host.clone());
            registry.url = Some(host);
        })
    }

    /// GitHub Container Registry（プレフィックス: `ghcr.io/<user>`）
    pub fn github_container_registry(&mut self, username: &str) -> &mut DockerRegistry {
        self.get_or_create(Self::GITHUB_CONTAINER_REGISTRY, |registry| {
            registry.image_tag_prefix.set(format!("ghcr.io/{}", username));
            registry.url.get_or_insert_with(|| "ghcr.io".to_string());
        })
    }

    /// `github_container_registry` の短縮形
    pub fn ghcr(&mut self, username: &str) -> &mut DockerRegistry {
        self.github_container_registry(username)
    }

    /// Google Artifact Registry（プレフィックス: `<region>-docker.pkg.dev/<project>/<repo>`）
    pub fn google_artifact_registry(
        &mut self,
        project_id: &str,
        region: &str,
        repository_name: &str,
    ) -> &mut DockerRegistry {
        let host = format!("{}-docker.pkg.dev", region);
        let prefix = format!("{}/{}/{}", host, project_id, repository_name);
        self.get_or_create(Self::GOOGLE_ARTIFACT_REGISTRY, |registry| {
            registry.image_tag_prefix.set(prefix);
            registry.url = Some(host);
        })
    }

    pub fn get(&self, name: &str) -> Option<&DockerRegistry> {
        self.inner.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DockerRegistry> {
        self.inner.get_mut(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DockerRegistry> {
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

impl<'a> IntoIterator for &'a RegistryContainer {
    type Item = &'a DockerRegistry;
    type IntoIter = std::slice::Iter<'a, DockerRegistry>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_normalized() {
        let mut registries = RegistryContainer::default();
        let registry = registries.github_container_registry("octocat");
        assert_eq!(registry.prefix(), "ghcr.io/octocat/");
        assert_eq!(registry.qualify("main:1.0"), "ghcr.io/octocat/main:1.0");
    }

    #[test]
    fn test_prefix_already_slashed() {
        let mut registry = DockerRegistry::create("local");
        registry.image_tag_prefix.set("localhost:5000/".to_string());
        assert_eq!(registry.prefix(), "localhost:5000/");
    }

    #[test]
    fn test_missing_prefix_is_rejected() {
        let mut registry = DockerRegistry::create("bare");
        let err = registry.require_prefix().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(msg) if msg.contains("bare")));

        registry.image_tag_prefix.set(String::new());
        assert!(registry.require_prefix().is_err());

        registry.image_tag_prefix.set("localhost:5000".to_string());
        assert_eq!(registry.require_prefix().unwrap(), "localhost:5000/");
    }

    #[test]
    fn test_shortcut_twice_updates_existing_entry() {
        let mut registries = RegistryContainer::default();
        registries.docker_hub("alice");
        registries.docker_hub("bob");

        assert_eq!(registries.len(), 1);
        let hub = registries.get(RegistryContainer::DOCKER_HUB).unwrap();
        assert_eq!(hub.prefix(), "bob/");
    }

    #[test]
    fn test_amazon_ecr() {
        let mut registries = RegistryContainer::default();
        let ecr = registries.amazon_ecr("123456789012", "eu-west-1");
        assert_eq!(
            ecr.prefix(),
            "123456789012.dkr.ecr.eu-west-1.amazonaws.com/"
        );
        assert_eq!(
            ecr.url.as_deref(),
            Some("123456789012.dkr.ecr.eu-west-1.amazonaws.com")
        );
    }

    #[test]
    fn test_google_artifact_registry() {
        let mut registries = RegistryContainer::default();
        let gar = registries.google_artifact_registry("my-project", "europe-west1", "images");
        assert_eq!(
            gar.prefix(),
            "europe-west1-docker.pkg.dev/my-project/images/"
        );
        assert_eq!(gar.url.as_deref(), Some("europe-west1-docker.pkg.dev"));
    }

    #[test]
    fn test_ghcr_alias_shares_entry() {
        let mut registries = RegistryContainer::default();
        registries.github_container_registry("a");
        registries.ghcr("b");

        assert_eq!(registries.names(), vec!["ghcr"]);
        assert_eq!(registries.get("ghcr").unwrap().prefix(), "ghcr.io/b/");
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut registries = RegistryContainer::default();
        registries.register("local").unwrap();
        assert!(registries.register("local").is_err());
    }

    #[test]
    fn test_login_password_prefers_literal() {
        let mut registry = DockerRegistry::create("local");
        registry.password_env = Some("DOCKERFLOW_TEST_REGISTRY_PW".to_string());

        temp_env::with_var("DOCKERFLOW_TEST_REGISTRY_PW", Some("from-env"), || {
            assert_eq!(registry.login_password().as_deref(), Some("from-env"));

            registry.password = Some("literal".to_string());
            assert_eq!(registry.login_password().as_deref(), Some("literal"));
        });
    }
}
