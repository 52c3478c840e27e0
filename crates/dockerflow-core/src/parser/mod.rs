//! KDLパーサー
//!
//! docker.kdl を既存の `DockerExtension` に適用します。
//! 同じ拡張に複数のファイルを順に適用でき、後から適用した値が優先されます。

mod image;
mod project;
mod registry;

use image::apply_images;
use project::{apply_project, parse_application};
use registry::apply_registries;

use crate::error::{ConfigError, Result};
use crate::loader::LoadOptions;
use crate::model::DockerExtension;
use kdl::{KdlDocument, KdlNode};
use std::fs;
use std::path::Path;

/// KDLファイルを読み込んで適用
pub fn apply_kdl_file<P: AsRef<Path>>(
    ext: &mut DockerExtension,
    path: P,
    options: &LoadOptions,
) -> Result<()> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Applying config file");
    let content = fs::read_to_string(path)?;
    apply_kdl_string(ext, &content, options)
}

/// KDL文字列を適用
pub fn apply_kdl_string(
    ext: &mut DockerExtension,
    content: &str,
    options: &LoadOptions,
) -> Result<()> {
    let doc: KdlDocument = content.parse()?;

    for node in doc.nodes() {
        match node.name().value() {
            "project" => apply_project(ext, node)?,
            "application" => {
                ext.project.application = Some(parse_application(node, &ext.project.name));
            }
            "registries" => {
                if let Some(children) = node.children() {
                    apply_registries(&mut ext.registries, children, options)?;
                }
            }
            "images" => {
                if let Some(children) = node.children() {
                    apply_images(&mut ext.images, children)?;
                }
            }
            other => {
                tracing::debug!(node = other, "Skipping unknown node");
            }
        }
    }

    Ok(())
}

/// 位置引数（文字列）を順に取得
fn arguments(node: &KdlNode) -> impl Iterator<Item = &str> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
}

fn first_argument(node: &KdlNode) -> Option<&str> {
    arguments(node).next()
}

fn required_argument<'a>(node: &'a KdlNode, what: &str) -> Result<&'a str> {
    first_argument(node).ok_or_else(|| {
        ConfigError::InvalidConfig(format!(
            "{} には {} が必要です",
            node.name().value(),
            what
        ))
    })
}
