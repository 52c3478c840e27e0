//! JVMアプリケーション用 Dockerfile の生成

use std::path::{Path, PathBuf};

/// JVMアプリケーション用の Dockerfile を生成
///
/// 配布物の `bin/` と `lib/` を `<app_name>/` 以下にコピーし、
/// 起動スクリプトを CMD に設定します。`extra` はそのまま挿入され、
/// エスケープは行いません。末尾に改行は付きません。
pub fn render_jvm_dockerfile(
    base_image: &str,
    base_tag: &str,
    app_name: &str,
    extra: Option<&str>,
) -> String {
    format!(
        "FROM {base_image}:{base_tag}\n\
         \n\
         COPY bin {app_name}/bin\n\
         COPY lib {app_name}/lib\n\
         \n\
         {extra}\n\
         \n\
         CMD [\"{app_name}/bin/{app_name}\"]",
        extra = extra.unwrap_or(""),
    )
}

/// 生成した Dockerfile の出力先
///
/// `<build_dir>/dockerfiles/<project>-<base_image>-<base_tag>.dockerfile`
pub fn jvm_dockerfile_path(
    build_dir: &Path,
    project_name: &str,
    base_image: &str,
    base_tag: &str,
) -> PathBuf {
    build_dir.join("dockerfiles").join(format!(
        "{}-{}-{}.dockerfile",
        project_name, base_image, base_tag
    ))
}

/// application 設定がないのに JVM 設定が要求された場合のメッセージ
pub fn jvm_app_error_message(image_name: &str, project_root: &Path) -> String {
    format!(
        "To configure Docker image '{image_name}' as a JVM App you need an application block.\n\
         Add it to docker.kdl in project {root}:\n\
         \n\
         ```kdl\n\
         application {{\n    \
             install-command \"./gradlew\" \"installDist\"\n\
         }}\n\
         ```",
        root = project_root.display(),
    )
}
