use crate::utils::ProjectContext;
use dockerflow_build::TaskAction;
use dockerflow_build::jvm::jvm_dockerfile_task_name;

/// JVM規約で生成される Dockerfile を標準出力へ
pub fn handle(ctx: &ProjectContext, image: &str) -> anyhow::Result<()> {
    if ctx.ext.images.get(image).is_none() {
        anyhow::bail!("イメージ '{}' は定義されていません", image);
    }

    let graph = ctx.task_graph()?;
    let task_name = jvm_dockerfile_task_name(image);
    match graph.get(&task_name).map(|task| &task.action) {
        Some(TaskAction::WriteFile { contents, .. }) => {
            println!("{}", contents);
            Ok(())
        }
        _ => anyhow::bail!(
            "イメージ '{}' はJVMアプリケーションとして構成されていません\n\
             application ブロックを定義するか、イメージに jvm-application を指定してください",
            image
        ),
    }
}
