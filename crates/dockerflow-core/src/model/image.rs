//! イメージ定義

use super::container::Named;
use super::files::FileSpec;
use super::property::Property;
use serde::Serialize;

/// buildx のターゲットプラットフォーム
pub mod platform {
    pub const LINUX_AMD64: &str = "linux/amd64";
    pub const LINUX_ARM64: &str = "linux/arm64";
    pub const LINUX_ARM64_V8: &str = "linux/arm64/v8";
    pub const LINUX_ARM_V7: &str = "linux/arm/v7";
    pub const LINUX_ARM_V6: &str = "linux/arm/v6";
    pub const LINUX_S390X: &str = "linux/s390x";
    pub const LINUX_PPC64LE: &str = "linux/ppc64le";
    pub const LINUX_386: &str = "linux/386";

    /// 既定のプラットフォーム
    pub fn defaults() -> Vec<String> {
        vec![LINUX_AMD64.to_string(), LINUX_ARM64_V8.to_string()]
    }
}

/// 既定の（プライマリ）イメージ名
pub const MAIN_IMAGE: &str = "main";

/// イメージ定義
///
/// KDL形式：
/// ```kdl
/// image "api" {
///     image-name "my-api"
///     image-version "1.2.0"
///     latest-tag #false
///     platforms "linux/amd64"
///     build-args {
///         RUST_VERSION "1.85"
///     }
///     files {
///         from "docker/api"
///     }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct DockerImage {
    name: String,
    /// イメージ名（既定: コレクション内の名前）
    pub image_name: Property<String>,
    /// イメージバージョン（未設定ならプロジェクトバージョン）
    pub image_version: Property<String>,
    /// `--build-arg` に渡す引数（宣言順）
    pub build_args: Vec<(String, String)>,
    /// buildx のターゲットプラットフォーム
    pub platforms: Property<Vec<String>>,
    /// レジストリごとに `latest` タグを付与するか
    pub is_latest_tag: Property<bool>,
    /// ビルドコンテキスト
    pub files: FileSpec,
    /// JVMアプリケーションとしての Dockerfile 生成設定
    pub jvm: Option<JvmApplication>,
}

impl Named for DockerImage {
    const KIND: &'static str = "イメージ";

    fn create(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image_name: Property::with_convention(name.to_string()),
            image_version: Property::default(),
            build_args: Vec::new(),
            platforms: Property::with_convention(platform::defaults()),
            is_latest_tag: Property::with_convention(true),
            files: FileSpec::default(),
            jvm: None,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl DockerImage {
    /// ビルド引数を設定（同じキーは宣言位置を保ったまま値を置き換える）
    pub fn set_build_arg(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.build_args.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.build_args.push((key, value));
        }
    }

    /// 解決済みのイメージ名
    pub fn resolved_image_name(&self) -> String {
        self.image_name.get_or_else(|| self.name.clone())
    }

    /// 解決済みのバージョン（未設定ならプロジェクトバージョン）
    pub fn resolved_version(&self, project_version: &str) -> String {
        self.image_version.get_or_else(|| project_version.to_string())
    }

    /// ベースタグ `<imageName>:<version>`
    pub fn base_tag(&self, project_version: &str) -> String {
        format!(
            "{}:{}",
            self.resolved_image_name(),
            self.resolved_version(project_version)
        )
    }

    pub fn resolved_platforms(&self) -> Vec<String> {
        self.platforms.get_or_else(Vec::new)
    }

    pub fn resolved_latest_tag(&self) -> bool {
        self.is_latest_tag.get_or_else(|| true)
    }
}

/// JVMアプリケーション用 Dockerfile の生成設定
///
/// KDL形式：
/// ```kdl
/// jvm-application base-image="eclipse-temurin" base-tag="21" {
///     additional-config "RUN echo \"Hello, World!\""
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JvmApplication {
    pub base_image_name: String,
    pub base_image_tag: String,
    /// Dockerfile に追加する行
    pub additional_config: Option<String>,
}

impl JvmApplication {
    pub const DEFAULT_BASE_IMAGE: &'static str = "eclipse-temurin";
    pub const DEFAULT_BASE_TAG: &'static str = "21";
}

impl Default for JvmApplication {
    fn default() -> Self {
        Self {
            base_image_name: Self::DEFAULT_BASE_IMAGE.to_string(),
            base_image_tag: Self::DEFAULT_BASE_TAG.to_string(),
            additional_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_defaults() {
        let image = DockerImage::create("api");
        assert_eq!(image.name(), "api");
        assert_eq!(image.resolved_image_name(), "api");
        assert!(image.resolved_latest_tag());
        assert_eq!(
            image.resolved_platforms(),
            vec!["linux/amd64".to_string(), "linux/arm64/v8".to_string()]
        );
        assert!(image.build_args.is_empty());
        assert!(image.files.is_empty());
        assert!(image.jvm.is_none());
    }

    #[test]
    fn test_base_tag_falls_back_to_project_version() {
        let mut image = DockerImage::create("api");
        assert_eq!(image.base_tag("0.3.0"), "api:0.3.0");

        image.image_version.set("1.0".to_string());
        image.image_name.set("my-api".to_string());
        assert_eq!(image.base_tag("0.3.0"), "my-api:1.0");
    }

    #[test]
    fn test_set_build_arg_keeps_declaration_order() {
        let mut image = DockerImage::create("api");
        image.set_build_arg("A", "1");
        image.set_build_arg("B", "2");
        image.set_build_arg("A", "3");

        assert_eq!(
            image.build_args,
            vec![
                ("A".to_string(), "3".to_string()),
                ("B".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_platforms_are_respected() {
        let mut image = DockerImage::create("api");
        image.platforms.set(Vec::new());
        assert!(image.resolved_platforms().is_empty());
    }

    #[test]
    fn test_jvm_defaults() {
        let jvm = JvmApplication::default();
        assert_eq!(jvm.base_image_name, "eclipse-temurin");
        assert_eq!(jvm.base_image_tag, "21");
        assert!(jvm.additional_config.is_none());
    }
}
