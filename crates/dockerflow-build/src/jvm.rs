//! JVMアプリケーション規約
//!
//! application 設定を持つプロジェクトでは、配布物（`bin/`, `lib/`）と
//! 生成した Dockerfile をイメージのビルドコンテキストに加えます。

use crate::dockerfile::{jvm_app_error_message, jvm_dockerfile_path, render_jvm_dockerfile};
use crate::error::Result;
use crate::graph::{Task, TaskAction, TaskGraph, TaskGroup};
use dockerflow_core::{
    ConfigError, CopySource, DockerExtension, JvmApplication, MAIN_IMAGE, Named, to_task_segment,
};
use tracing::{debug, error, info};

/// 配布物を生成するタスク
pub const INSTALL_DIST: &str = "installDist";

/// Dockerfile 生成タスク名 `create<I>JvmAppDockerfile`
pub fn jvm_dockerfile_task_name(image: &str) -> String {
    format!("create{}JvmAppDockerfile", to_task_segment(image))
}

/// JVM設定を持つイメージと、application プロジェクトの main に規約を適用
///
/// main は明示的な `jvm-application` がなくても既定値で構成されます。
pub fn apply_jvm_conventions(graph: &mut TaskGraph, ext: &mut DockerExtension) -> Result<()> {
    let mut targets: Vec<(String, JvmApplication)> = ext
        .images
        .iter()
        .filter_map(|image| image.jvm.clone().map(|jvm| (image.name().to_string(), jvm)))
        .collect();

    if ext.project.is_application() && !targets.iter().any(|(name, _)| name == MAIN_IMAGE) {
        debug!("Application project detected, configuring main image as JVM app");
        targets.insert(0, (MAIN_IMAGE.to_string(), JvmApplication::default()));
    }

    for (image, jvm) in targets {
        configure_jvm_application(graph, ext, &image, &jvm)?;
    }
    Ok(())
}

/// イメージをJVMアプリケーションとして構成
///
/// application 設定がなければエラーを記録して `Ok(false)` を返し、何も変更しません。
/// Dockerfile 生成タスクが既にある場合は、そのタスクの設定だけを更新します。
pub fn configure_jvm_application(
    graph: &mut TaskGraph,
    ext: &mut DockerExtension,
    image_name: &str,
    jvm: &JvmApplication,
) -> Result<bool> {
    let Some(app) = ext.project.application.clone() else {
        error!("{}", jvm_app_error_message(image_name, &ext.project.root));
        return Ok(false);
    };
    if ext.images.get(image_name).is_none() {
        return Err(ConfigError::ImageNotFound(image_name.to_string()).into());
    }

    let task_name = jvm_dockerfile_task_name(image_name);
    let path = jvm_dockerfile_path(
        &ext.project.build_dir,
        &ext.project.name,
        &jvm.base_image_name,
        &jvm.base_image_tag,
    );
    let action = TaskAction::WriteFile {
        path: path.clone(),
        contents: render_jvm_dockerfile(
            &jvm.base_image_name,
            &jvm.base_image_tag,
            app.resolved_name(),
            jvm.additional_config.as_deref(),
        ),
    };

    if let Some(existing) = graph.get_mut(&task_name) {
        info!(task = %task_name, "Task already registered, updating its configuration");
        existing.action = action;
        if let Some(image) = ext.images.get_mut(image_name) {
            for source in &mut image.files.sources {
                if source.produced_by.as_deref() == Some(task_name.as_str()) {
                    source.from = path.clone();
                }
            }
        }
        return Ok(true);
    }

    graph.register(
        Task::new(&task_name, action)
            .group(TaskGroup::Docker)
            .description(format!("Generates the JVM app Dockerfile for image '{}'", image_name)),
    )?;

    let mut distribution = CopySource::new(app.resolved_install_dir());
    if let Some((program, args)) = app.install_command.split_first() {
        graph.get_or_register(INSTALL_DIST, || {
            Task::new(
                INSTALL_DIST,
                TaskAction::Exec {
                    executable: program.clone(),
                    args: args.to_vec(),
                    ignore_exit_value: false,
                },
            )
            .group(TaskGroup::Distribution)
            .description(format!("Installs the '{}' distribution", app.resolved_name()))
        });
        distribution = distribution.produced_by(INSTALL_DIST);
    }

    if let Some(image) = ext.images.get_mut(image_name) {
        image
            .files
            .from(distribution)
            .from(CopySource::new(&path).rename("Dockerfile").produced_by(&task_name));
    }

    info!(image = image_name, dockerfile = %path.display(), "Configured JVM application image");
    Ok(true)
}
