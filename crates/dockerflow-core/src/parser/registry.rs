//! registries ノードのパース

use super::{arguments, first_argument, required_argument};
use crate::error::{ConfigError, Result};
use crate::loader::LoadOptions;
use crate::model::{DockerRegistry, RegistryContainer};
use kdl::{KdlDocument, KdlNode};

/// registries ブロックを適用
pub fn apply_registries(
    registries: &mut RegistryContainer,
    doc: &KdlDocument,
    options: &LoadOptions,
) -> Result<()> {
    for node in doc.nodes() {
        match node.name().value() {
            "registry" => {
                let name = required_argument(node, "レジストリ名")?;
                let registry = registries.get_or_create(name, |_| {});
                apply_registry_body(registry, node);
            }
            "docker-hub" => {
                let username = required_argument(node, "ユーザー名")?;
                let registry = registries.docker_hub(username);
                apply_registry_body(registry, node);
            }
            "amazon-ecr" => {
                let [account_id, region] = positional::<2>(node, "アカウントIDとリージョン")?;
                let registry = registries.amazon_ecr(account_id, region);
                apply_registry_body(registry, node);
            }
            "github-container-registry" | "ghcr" => {
                let owner = first_argument(node).or(options.repository_owner.as_deref());
                match owner {
                    Some(owner) => {
                        let registry = registries.github_container_registry(owner);
                        apply_registry_body(registry, node);
                    }
                    None => {
                        tracing::warn!(
                            "github-container-registry has no owner and REPOSITORY_OWNER is not set; skipping"
                        );
                    }
                }
            }
            "google-artifact-registry" => {
                let [project_id, region, repository] =
                    positional::<3>(node, "プロジェクトID・リージョン・リポジトリ名")?;
                let registry = registries.google_artifact_registry(project_id, region, repository);
                apply_registry_body(registry, node);
            }
            other => {
                tracing::debug!(node = other, "Skipping unknown registry node");
            }
        }
    }
    Ok(())
}

/// 子ノード（認証情報やプレフィックス）を適用
fn apply_registry_body(registry: &mut DockerRegistry, node: &KdlNode) {
    let Some(children) = node.children() else {
        return;
    };

    for child in children.nodes() {
        let value = first_argument(child).map(str::to_string);
        match child.name().value() {
            "image-tag-prefix" => {
                if let Some(prefix) = value {
                    registry.image_tag_prefix.set(prefix);
                }
            }
            "url" => registry.url = value,
            "username" => registry.username = value,
            "password" => registry.password = value,
            "password-env" => registry.password_env = value,
            other => {
                tracing::debug!(node = other, "Skipping unknown registry property");
            }
        }
    }
}

/// 必須の位置引数を N 個取得
fn positional<'a, const N: usize>(node: &'a KdlNode, what: &str) -> Result<[&'a str; N]> {
    let args: Vec<&str> = arguments(node).collect();
    args.get(..N)
        .and_then(|slice| <[&str; N]>::try_from(slice).ok())
        .ok_or_else(|| {
            ConfigError::InvalidConfig(format!(
                "{} には {} が必要です（{}個の引数）",
                node.name().value(),
                what,
                N
            ))
        })
}
