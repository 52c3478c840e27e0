//! イメージ・レジストリ設定からタスクグラフへの展開
//!
//! イメージ `I` ごとに準備・ビルド・buildx ビルド・実行タスクを、
//! `I` × レジストリ `R` ごとに push と buildx push タスクを宣言します。
//!
//! | タスク | 処理 | 依存 |
//! |--------|------|------|
//! | `dockerPrepare<I>` | files を準備ディレクトリへ同期 | files の生成タスク |
//! | `dockerBuild<I>` | `docker build` | prepare |
//! | `dockerBuildxBuild<I>` | `docker buildx build --load` | prepare |
//! | `dockerPublish<I>To<R>` | `docker push` | `dockerBuild<I>` |
//! | `dockerBuildxPublish<I>To<R>` | `docker buildx build --push` | prepare |
//! | `dockerRun` / `dockerRun<I>` | `docker run --rm` | `dockerBuild<I>` |
//!
//! すべてのタスクは get-or-register で作成され、同名のタスクが既にあれば
//! 先に登録されたものが使われます。

use crate::error::{BuildError, Result};
use crate::graph::{Task, TaskAction, TaskGraph, TaskGroup};
use crate::jvm::apply_jvm_conventions;
use dockerflow_core::{
    DockerExtension, DockerImage, DockerRegistry, MAIN_IMAGE, Named, Project, RegistryContainer,
    task_name, to_task_segment,
};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 全イメージのビルド
pub const BUILD_ALL: &str = "dockerBuild";
/// 全イメージを全レジストリへ push
pub const PUSH_ALL: &str = "dockerPush";
/// 全イメージの buildx ビルド
pub const BUILDX_BUILD_ALL: &str = "dockerBuildxBuild";
/// 全イメージを全レジストリへ buildx push
pub const BUILDX_PUSH_ALL: &str = "dockerBuildxPush";
/// 全レジストリへのログイン
pub const LOGIN_ALL: &str = "dockerLogin";
/// buildx ビルダーの作成
pub const CREATE_BUILDX_BUILDER: &str = "createBuildxBuilder";
/// `createBuildxBuilder` で作成するビルダー名
pub const BUILDX_BUILDER_NAME: &str = "dockerflow-builder";

pub fn prepare_task_name(image: &str) -> String {
    task_name("dockerPrepare", image)
}

pub fn build_task_name(image: &str) -> String {
    task_name("dockerBuild", image)
}

pub fn buildx_build_task_name(image: &str) -> String {
    task_name("dockerBuildxBuild", image)
}

pub fn publish_task_name(image: &str, registry: &str) -> String {
    format!(
        "dockerPublish{}To{}",
        to_task_segment(image),
        to_task_segment(registry)
    )
}

pub fn buildx_publish_task_name(image: &str, registry: &str) -> String {
    format!(
        "dockerBuildxPublish{}To{}",
        to_task_segment(image),
        to_task_segment(registry)
    )
}

/// 既定イメージは `dockerRun`、それ以外は `dockerRun<I>`
pub fn run_task_name(image: &str) -> String {
    if image == MAIN_IMAGE {
        "dockerRun".to_string()
    } else {
        task_name("dockerRun", image)
    }
}

pub fn publish_all_task_name(registry: &str) -> String {
    task_name("publishAllImagesTo", registry)
}

pub fn buildx_publish_all_task_name(registry: &str) -> String {
    task_name("publishAllBuildxImagesTo", registry)
}

pub fn login_task_name(registry: &str) -> String {
    task_name("dockerLogin", registry)
}

/// 準備ディレクトリ `<build>/docker/prepare/<name>`（絶対パス）
pub fn prepare_dir(project: &Project, image: &str) -> Result<PathBuf> {
    let dir = project.build_dir.join("docker").join("prepare").join(image);
    Ok(std::path::absolute(dir)?)
}

/// `docker build` の引数
///
/// `build [--build-arg k=v]* -t <base> [-t <prefix><base> [-t <prefix><name>:latest]]* <dir>`
pub fn docker_build_args(
    image: &DockerImage,
    base_tag: &str,
    registries: &RegistryContainer,
    context_dir: &Path,
) -> Vec<String> {
    let mut args = vec!["build".to_string()];
    push_build_args(&mut args, image);
    args.extend(["-t".to_string(), base_tag.to_string()]);
    for registry in registries {
        for tag in registry_tags(image, base_tag, registry) {
            args.extend(["-t".to_string(), tag]);
        }
    }
    args.push(context_dir.display().to_string());
    args
}

/// `docker buildx build` の引数
///
/// ビルド（`--load`）と公開（`--push`）で共通です。
pub fn buildx_args(
    image: &DockerImage,
    base_tag: &str,
    registries: &RegistryContainer,
    context_dir: &Path,
    publish: bool,
) -> Vec<String> {
    let mut args = vec!["buildx".to_string(), "build".to_string()];
    let platforms = image.resolved_platforms();
    if !platforms.is_empty() {
        args.extend(["--platform".to_string(), platforms.join(",")]);
    }
    push_build_args(&mut args, image);
    for registry in registries {
        for tag in registry_tags(image, base_tag, registry) {
            args.extend(["--tag".to_string(), tag]);
        }
    }
    args.push(if publish { "--push" } else { "--load" }.to_string());
    args.push(context_dir.display().to_string());
    args
}

fn push_build_args(args: &mut Vec<String>, image: &DockerImage) {
    for (key, value) in &image.build_args {
        args.extend(["--build-arg".to_string(), format!("{}={}", key, value)]);
    }
}

/// レジストリ用のタグ（ベースタグ、必要なら latest）
fn registry_tags(image: &DockerImage, base_tag: &str, registry: &DockerRegistry) -> Vec<String> {
    let mut tags = vec![registry.qualify(base_tag)];
    if image.resolved_latest_tag() {
        tags.push(registry.qualify(&format!("{}:latest", image.resolved_image_name())));
    }
    tags
}

/// 設定全体からタスクグラフを作成
///
/// JVMアプリケーションの規約を適用した後、全イメージとレジストリを展開します。
#[tracing::instrument(skip(ext), fields(project = %ext.project.name))]
pub fn build_task_graph(ext: &mut DockerExtension) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new();
    apply_jvm_conventions(&mut graph, ext)?;
    compose(&mut graph, ext)?;
    tracing::info!(tasks = graph.len(), "Task graph expanded");
    Ok(graph)
}

/// イメージとレジストリをグラフに展開
pub fn compose(graph: &mut TaskGraph, ext: &DockerExtension) -> Result<()> {
    check_task_segments("Image", ext.images.names())?;
    check_task_segments("Registry", ext.registries.names())?;
    check_pair_task_names(ext)?;
    for registry in &ext.registries {
        registry.require_prefix()?;
    }

    register_collectors(graph);
    register_logins(graph, &ext.registries)?;

    for image in &ext.images {
        compose_image(graph, ext, image)?;
    }
    Ok(())
}

fn register_collectors(graph: &mut TaskGraph) {
    let collectors = [
        (BUILD_ALL, TaskGroup::Build, "Builds all Docker images"),
        (PUSH_ALL, TaskGroup::Publishing, "Pushes all Docker images to all registries"),
        (BUILDX_BUILD_ALL, TaskGroup::Build, "Builds all Docker images with buildx"),
        (
            BUILDX_PUSH_ALL,
            TaskGroup::Publishing,
            "Builds and pushes all Docker images with buildx",
        ),
        (LOGIN_ALL, TaskGroup::Docker, "Logs in to all registries with credentials"),
    ];
    for (name, group, description) in collectors {
        graph.get_or_register(name, || {
            Task::lifecycle(name).group(group).description(description)
        });
    }

    graph.get_or_register(CREATE_BUILDX_BUILDER, || {
        Task::new(
            CREATE_BUILDX_BUILDER,
            TaskAction::Exec {
                executable: "docker".to_string(),
                args: ["buildx", "create", "--name", BUILDX_BUILDER_NAME, "--use"]
                    .map(String::from)
                    .to_vec(),
                // 同名のビルダーが既にあると非ゼロで終了する
                ignore_exit_value: true,
            },
        )
        .group(TaskGroup::Docker)
        .description("Creates and selects a buildx builder")
    });
}

fn register_logins(graph: &mut TaskGraph, registries: &RegistryContainer) -> Result<()> {
    for registry in registries {
        let (Some(url), Some(username), Some(password)) = (
            registry.url.as_deref(),
            registry.username.as_deref(),
            registry.login_password(),
        ) else {
            debug!(registry = registry.name(), "No credentials, skipping login task");
            continue;
        };

        let name = login_task_name(registry.name());
        graph.get_or_register(&name, || {
            Task::new(
                &name,
                TaskAction::docker(
                    ["login", "-u", username, "-p", password.as_str(), url]
                        .map(String::from)
                        .to_vec(),
                ),
            )
            .group(TaskGroup::Docker)
            .description(format!("Logs in to {}", url))
        });
        graph.depends_on(LOGIN_ALL, &name)?;
    }
    Ok(())
}

fn compose_image(graph: &mut TaskGraph, ext: &DockerExtension, image: &DockerImage) -> Result<()> {
    let project = &ext.project;
    let name = image.name();
    let context_dir = prepare_dir(project, name)?;
    let base_tag = image.base_tag(&project.version);
    debug!(image = name, base_tag = %base_tag, "Composing image tasks");

    // 準備
    let prepare = prepare_task_name(name);
    graph.get_or_register(&prepare, || {
        let sources = image
            .files
            .sources
            .iter()
            .map(|source| {
                let mut source = source.clone();
                source.from = project.resolve(&source.from);
                source
            })
            .collect();
        let mut task = Task::new(
            &prepare,
            TaskAction::Sync {
                sources,
                into: context_dir.clone(),
            },
        )
        .description(format!("Prepares the build context of image '{}'", name));
        for producer in image.files.producers() {
            task.depends_on(producer);
        }
        task
    });

    // ビルド
    let build = build_task_name(name);
    graph.get_or_register(&build, || {
        Task::new(
            &build,
            TaskAction::docker(docker_build_args(
                image,
                &base_tag,
                &ext.registries,
                &context_dir,
            )),
        )
        .group(TaskGroup::Build)
        .description(format!("Builds image {}", base_tag))
        .depending_on(&prepare)
    });
    graph.depends_on(BUILD_ALL, &build)?;

    // buildx ビルド
    let buildx_build = buildx_build_task_name(name);
    graph.get_or_register(&buildx_build, || {
        Task::new(
            &buildx_build,
            TaskAction::docker(buildx_args(
                image,
                &base_tag,
                &ext.registries,
                &context_dir,
                false,
            )),
        )
        .group(TaskGroup::Build)
        .description(format!("Builds image {} with buildx", base_tag))
        .depending_on(&prepare)
    });
    graph.depends_on(BUILDX_BUILD_ALL, &buildx_build)?;

    for registry in &ext.registries {
        compose_publication(graph, image, registry, &base_tag, &build)?;
        compose_buildx_publication(graph, ext, image, registry, &base_tag, &prepare, &context_dir)?;
    }

    // 実行
    let run = run_task_name(name);
    graph.get_or_register(&run, || {
        Task::new(
            &run,
            TaskAction::docker(["run", "--rm", base_tag.as_str()].map(String::from).to_vec()),
        )
        .group(TaskGroup::Docker)
        .description(format!("Runs image {}", base_tag))
        .depending_on(&build)
    });

    Ok(())
}

fn compose_publication(
    graph: &mut TaskGraph,
    image: &DockerImage,
    registry: &DockerRegistry,
    base_tag: &str,
    build: &str,
) -> Result<()> {
    let publish = publish_task_name(image.name(), registry.name());
    graph.get_or_register(&publish, || {
        Task::new(
            &publish,
            TaskAction::docker(vec!["push".to_string(), registry.qualify(base_tag)]),
        )
        .group(TaskGroup::Publishing)
        .description(format!("Pushes {} to {}", base_tag, registry.name()))
        .depending_on(build)
    });

    let publish_all = publish_all_task_name(registry.name());
    graph
        .get_or_register(&publish_all, || {
            Task::lifecycle(&publish_all)
                .group(TaskGroup::Publishing)
                .description(format!("Pushes all images to {}", registry.name()))
        })
        .depends_on(&publish);
    graph.depends_on(PUSH_ALL, &publish)
}

fn compose_buildx_publication(
    graph: &mut TaskGraph,
    ext: &DockerExtension,
    image: &DockerImage,
    registry: &DockerRegistry,
    base_tag: &str,
    prepare: &str,
    context_dir: &Path,
) -> Result<()> {
    let publish = buildx_publish_task_name(image.name(), registry.name());
    graph.get_or_register(&publish, || {
        Task::new(
            &publish,
            TaskAction::docker(buildx_args(
                image,
                base_tag,
                &ext.registries,
                context_dir,
                true,
            )),
        )
        .group(TaskGroup::Publishing)
        .description(format!(
            "Builds and pushes {} to {} with buildx",
            base_tag,
            registry.name()
        ))
        .depending_on(prepare)
    });

    let publish_all = buildx_publish_all_task_name(registry.name());
    graph
        .get_or_register(&publish_all, || {
            Task::lifecycle(&publish_all)
                .group(TaskGroup::Publishing)
                .description(format!("Pushes all buildx images to {}", registry.name()))
        })
        .depends_on(&publish);
    graph.depends_on(BUILDX_PUSH_ALL, &publish)
}

/// 異なる名前が同じタスク名セグメントになる場合はエラー
fn check_task_segments<'a>(
    kind: &'static str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for name in names {
        let segment = to_task_segment(name);
        if segment.is_empty() {
            return Err(BuildError::EmptyTaskSegment {
                kind,
                name: name.to_string(),
            });
        }
        if let Some(first) = seen.get(&segment) {
            return Err(BuildError::TaskNameCollision {
                kind,
                first: first.to_string(),
                second: name.to_string(),
                segment,
            });
        }
        seen.insert(segment, name);
    }
    Ok(())
}

/// 異なるイメージとレジストリの組が同じ公開タスク名になる場合はエラー
///
/// 例: `a-to-b` + `c` と `a` + `b-to-c` はどちらも `dockerPublishAToBToC`。
fn check_pair_task_names(ext: &DockerExtension) -> Result<()> {
    let mut owners: HashMap<String, String> = HashMap::new();
    for image in &ext.images {
        for registry in &ext.registries {
            let pair = format!("{}/{}", image.name(), registry.name());
            let tasks = [
                publish_task_name(image.name(), registry.name()),
                buildx_publish_task_name(image.name(), registry.name()),
            ];
            for task in tasks {
                match owners.entry(task) {
                    Entry::Occupied(entry) => {
                        return Err(BuildError::PairTaskCollision {
                            first: entry.get().clone(),
                            second: pair,
                            task: entry.key().clone(),
                        });
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(pair.clone());
                    }
                }
            }
        }
    }
    Ok(())
}
