//! タスクの実行
//!
//! 対象タスクの依存を解決し、依存順に1つずつ実行します。
//! 失敗したタスクがあればその時点で停止します。

use crate::error::{BuildError, Result};
use crate::graph::{Task, TaskAction, TaskGraph};
use crate::progress::TaskProgress;
use crate::sync::sync_sources;
use colored::Colorize;
use dockerflow_core::CopySource;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// 各タスクの実行結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// dry-run で実行しなかった
    Planned,
    /// 処理を持たない集約タスク
    Lifecycle,
    Succeeded,
    /// 非ゼロ終了を許容するタスクが失敗した
    IgnoredFailure { code: Option<i32> },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub tasks: Vec<(String, TaskOutcome)>,
}

impl ExecutionReport {
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn outcome(&self, task: &str) -> Option<&TaskOutcome> {
        self.tasks
            .iter()
            .find(|(name, _)| name == task)
            .map(|(_, outcome)| outcome)
    }
}

/// タスクグラフの実行器
///
/// 外部プロセスは `working_dir`（プロジェクトルート）で起動され、
/// 標準入出力はそのまま引き継がれます。
pub struct Executor {
    working_dir: PathBuf,
    dry_run: bool,
    show_progress: bool,
}

impl Executor {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            dry_run: false,
            show_progress: true,
        }
    }

    /// 実行せずに計画だけを表示
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// スピナーと進捗表示の有無
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 対象タスクとその依存を依存順に実行
    pub async fn run<S: AsRef<str>>(
        &self,
        graph: &TaskGraph,
        targets: &[S],
    ) -> Result<ExecutionReport> {
        let order = graph.execution_order(targets)?;
        info!(tasks = order.len(), dry_run = self.dry_run, "Executing task plan");

        let mut report = ExecutionReport::default();
        for task in order {
            let outcome = if self.dry_run {
                self.print_planned(task);
                TaskOutcome::Planned
            } else {
                self.execute(task).await?
            };
            report.tasks.push((task.name.clone(), outcome));
        }
        Ok(report)
    }

    async fn execute(&self, task: &Task) -> Result<TaskOutcome> {
        debug!(task = %task.name, "Executing task");
        match &task.action {
            TaskAction::Lifecycle => Ok(TaskOutcome::Lifecycle),
            TaskAction::Exec {
                executable,
                args,
                ignore_exit_value,
            } => {
                self.announce(task);
                self.exec(task, executable, args, *ignore_exit_value).await
            }
            TaskAction::Sync { sources, into } => {
                self.announce(task);
                self.sync(task, sources, into).await?;
                Ok(TaskOutcome::Succeeded)
            }
            TaskAction::WriteFile { path, contents } => {
                self.announce(task);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, contents).await?;
                debug!(path = %path.display(), "Wrote file");
                Ok(TaskOutcome::Succeeded)
            }
        }
    }

    async fn exec(
        &self,
        task: &Task,
        executable: &str,
        args: &[String],
        ignore_exit_value: bool,
    ) -> Result<TaskOutcome> {
        let status = Command::new(executable)
            .args(args)
            .current_dir(&self.working_dir)
            .status()
            .await
            .map_err(|source| BuildError::Spawn {
                program: executable.to_string(),
                source,
            })?;

        if status.success() {
            return Ok(TaskOutcome::Succeeded);
        }
        if ignore_exit_value {
            warn!(task = %task.name, code = ?status.code(), "Ignoring non-zero exit");
            return Ok(TaskOutcome::IgnoredFailure {
                code: status.code(),
            });
        }
        Err(BuildError::ProcessFailed {
            task: task.name.clone(),
            code: status.code(),
        })
    }

    async fn sync(&self, task: &Task, sources: &[CopySource], into: &Path) -> Result<()> {
        let progress = if self.show_progress {
            TaskProgress::new(&task.name)
        } else {
            TaskProgress::hidden()
        };

        let owned_sources = sources.to_vec();
        let owned_into = into.to_path_buf();
        let result = tokio::task::spawn_blocking(move || sync_sources(&owned_sources, &owned_into))
            .await
            .map_err(|e| BuildError::Io(std::io::Error::other(e)))?;

        match result {
            Ok(summary) => {
                progress.finish_success(&format!(
                    "{} ({} files, {} bytes)",
                    task.name, summary.files, summary.bytes
                ));
                Ok(())
            }
            Err(e) => {
                progress.finish_error(&e.to_string());
                Err(e)
            }
        }
    }

    fn announce(&self, task: &Task) {
        if !self.show_progress {
            return;
        }
        println!("{} {}", "→".cyan(), task.name.bold());
        if let Some(command) = task.action.display_command() {
            println!("  {}", command.dimmed());
        }
    }

    fn print_planned(&self, task: &Task) {
        if !self.show_progress {
            return;
        }
        let detail = match &task.action {
            TaskAction::Lifecycle => String::new(),
            TaskAction::Sync { sources, into } => {
                format!("sync {} source(s) -> {}", sources.len(), into.display())
            }
            TaskAction::WriteFile { path, .. } => format!("write {}", path.display()),
            action => action.display_command().unwrap_or_default(),
        };
        if detail.is_empty() {
            println!("{} {}", "→".cyan(), task.name.bold());
        } else {
            println!("{} {}  {}", "→".cyan(), task.name.bold(), detail.dimmed());
        }
    }
}
