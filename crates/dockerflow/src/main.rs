mod commands;
mod docker;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use dockerflow_build::BuildError;
use dockerflow_core::LoadOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dockerflow")]
#[command(about = "docker.kdl から Docker イメージのビルド・公開タスクを組み立てて実行", long_about = None)]
struct Cli {
    /// プロジェクトディレクトリ（省略時は docker.kdl を上位に向かって探索）
    #[arg(short = 'p', long = "project-dir", global = true)]
    project_dir: Option<PathBuf>,

    /// ログを詳細にする（-v: info, -vv: debug）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// main イメージのバージョンを上書き
    #[arg(long, env = "IMAGE_VERSION", global = true)]
    image_version: Option<String>,

    /// 引数なしの github-container-registry に使うユーザー名
    #[arg(long, env = "REPOSITORY_OWNER", global = true)]
    repository_owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// タスクをグループごとに一覧表示
    Tasks {
        /// グループに属さない内部タスクも表示
        #[arg(short, long)]
        all: bool,
    },
    /// タスクの実行計画を表示（実行しない）
    Plan {
        /// 対象タスク
        #[arg(required = true)]
        tasks: Vec<String>,
        /// JSON形式で出力
        #[arg(long)]
        json: bool,
    },
    /// タスクを依存順に実行
    Run {
        /// 対象タスク
        #[arg(required = true)]
        tasks: Vec<String>,
        /// 実行せずに計画だけを表示
        #[arg(long)]
        dry_run: bool,
        /// Docker デーモンへの接続確認をスキップ
        #[arg(long)]
        no_preflight: bool,
    },
    /// 全イメージをビルド（dockerBuild / dockerBuildxBuild）
    Build {
        /// buildx でビルド
        #[arg(long)]
        buildx: bool,
        /// 実行せずに計画だけを表示
        #[arg(long)]
        dry_run: bool,
        /// Docker デーモンへの接続確認をスキップ
        #[arg(long)]
        no_preflight: bool,
    },
    /// 全イメージを全レジストリへ公開（dockerPush / dockerBuildxPush）
    Push {
        /// buildx でビルドして公開
        #[arg(long)]
        buildx: bool,
        /// 実行せずに計画だけを表示
        #[arg(long)]
        dry_run: bool,
        /// Docker デーモンへの接続確認をスキップ
        #[arg(long)]
        no_preflight: bool,
    },
    /// JVMアプリケーション用に生成される Dockerfile を表示
    Dockerfile {
        /// イメージ名
        #[arg(default_value = "main")]
        image: String,
    },
    /// 設定を検証
    Validate,
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!();
        match e.downcast_ref::<BuildError>() {
            Some(build_error) => {
                eprintln!("{}", "✗ エラー".red().bold());
                eprintln!("{}", build_error.user_message());
            }
            None => {
                eprintln!("{} {:#}", "✗ エラー:".red().bold(), e);
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("dockerflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let options = LoadOptions {
        image_version: cli.image_version,
        repository_owner: cli.repository_owner,
    };
    let project_dir = cli.project_dir.as_deref();

    match cli.command {
        Commands::Tasks { all } => {
            let ctx = utils::load_context(project_dir, &options)?;
            commands::tasks::handle(&ctx, all)?;
        }
        Commands::Plan { tasks, json } => {
            let ctx = utils::load_context(project_dir, &options)?;
            commands::plan::handle(&ctx, &tasks, json)?;
        }
        Commands::Run {
            tasks,
            dry_run,
            no_preflight,
        } => {
            let ctx = utils::load_context(project_dir, &options)?;
            commands::run::handle(&ctx, &tasks, dry_run, no_preflight).await?;
        }
        Commands::Build {
            buildx,
            dry_run,
            no_preflight,
        } => {
            let ctx = utils::load_context(project_dir, &options)?;
            let target = if buildx {
                dockerflow_build::BUILDX_BUILD_ALL
            } else {
                dockerflow_build::BUILD_ALL
            };
            commands::run::handle(&ctx, &[target.to_string()], dry_run, no_preflight).await?;
        }
        Commands::Push {
            buildx,
            dry_run,
            no_preflight,
        } => {
            let ctx = utils::load_context(project_dir, &options)?;
            let target = if buildx {
                dockerflow_build::BUILDX_PUSH_ALL
            } else {
                dockerflow_build::PUSH_ALL
            };
            commands::run::handle(&ctx, &[target.to_string()], dry_run, no_preflight).await?;
        }
        Commands::Dockerfile { image } => {
            let ctx = utils::load_context(project_dir, &options)?;
            commands::dockerfile::handle(&ctx, &image)?;
        }
        Commands::Validate => {
            commands::validate::handle(project_dir, &options)?;
        }
        Commands::Version => unreachable!("Version is handled before config loading"),
    }

    Ok(())
}
