//! images ノードのパース

use super::{arguments, first_argument, required_argument};
use crate::error::{ConfigError, Result};
use crate::model::{CopySource, DockerImage, FileSpec, ImageContainer, JvmApplication};
use kdl::{KdlDocument, KdlNode};

/// images ブロックを適用
///
/// `image "<name>" { ... }` と、既定イメージ用の `main { ... }` を受け付けます。
pub fn apply_images(images: &mut ImageContainer, doc: &KdlDocument) -> Result<()> {
    for node in doc.nodes() {
        match node.name().value() {
            "image" => {
                let name = required_argument(node, "イメージ名")?;
                let image = images.get_or_create(name, |_| {});
                apply_image_body(image, node)?;
            }
            "main" => {
                apply_image_body(images.main_mut(), node)?;
            }
            other => {
                tracing::debug!(node = other, "Skipping unknown images node");
            }
        }
    }
    Ok(())
}

fn apply_image_body(image: &mut DockerImage, node: &KdlNode) -> Result<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };

    for child in children.nodes() {
        match child.name().value() {
            "image-name" => {
                if let Some(name) = first_argument(child) {
                    image.image_name.set(name.to_string());
                }
            }
            "image-version" => {
                if let Some(version) = first_argument(child) {
                    image.image_version.set(version.to_string());
                }
            }
            "latest-tag" => {
                let value = child
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_bool())
                    .ok_or_else(|| {
                        ConfigError::InvalidConfig(
                            "latest-tag には #true または #false を指定してください".to_string(),
                        )
                    })?;
                image.is_latest_tag.set(value);
            }
            "platforms" => {
                image
                    .platforms
                    .set(arguments(child).map(str::to_string).collect());
            }
            "build-args" => {
                if let Some(args) = child.children() {
                    for arg in args.nodes() {
                        let value = first_argument(arg).unwrap_or("");
                        image.set_build_arg(arg.name().value(), value);
                    }
                }
            }
            "files" => {
                if let Some(files) = child.children() {
                    parse_files(&mut image.files, files)?;
                }
            }
            "jvm-application" => {
                image.jvm = Some(parse_jvm_application(child));
            }
            other => {
                tracing::debug!(node = other, "Skipping unknown image property");
            }
        }
    }

    Ok(())
}

/// files ブロックをパース（既存のコピー元に追加）
fn parse_files(spec: &mut FileSpec, doc: &KdlDocument) -> Result<()> {
    for node in doc.nodes() {
        if node.name().value() != "from" {
            tracing::debug!(node = node.name().value(), "Skipping unknown files node");
            continue;
        }

        let mut source = CopySource::new(required_argument(node, "コピー元パス")?);
        if let Some(rename) = node.get("rename").and_then(|v| v.as_string()) {
            source = source.rename(rename);
        }
        if let Some(task) = node.get("produced-by").and_then(|v| v.as_string()) {
            source = source.produced_by(task);
        }
        if let Some(filters) = node.children() {
            for filter in filters.nodes() {
                let patterns = arguments(filter).map(str::to_string);
                match filter.name().value() {
                    "include" => source.include.extend(patterns),
                    "exclude" => source.exclude.extend(patterns),
                    _ => {}
                }
            }
        }

        spec.from(source);
    }
    Ok(())
}

fn parse_jvm_application(node: &KdlNode) -> JvmApplication {
    let mut jvm = JvmApplication::default();

    if let Some(base) = node.get("base-image").and_then(|v| v.as_string()) {
        jvm.base_image_name = base.to_string();
    }
    if let Some(tag) = node.get("base-tag").and_then(|v| v.as_string()) {
        jvm.base_image_tag = tag.to_string();
    }

    if let Some(children) = node.children() {
        let lines: Vec<&str> = children
            .nodes()
            .iter()
            .filter(|child| child.name().value() == "additional-config")
            .flat_map(arguments)
            .collect();
        if !lines.is_empty() {
            jvm.additional_config = Some(lines.join("\n"));
        }
    }

    jvm
}
