//! タスクグラフ
//!
//! 名前で識別されるタスクと依存関係を保持し、依存順の実行計画を作ります。

use crate::error::{BuildError, Result};
use dockerflow_core::CopySource;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// `tasks` コマンドでの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskGroup {
    Build,
    Publishing,
    Docker,
    Distribution,
}

impl fmt::Display for TaskGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskGroup::Build => "build",
            TaskGroup::Publishing => "publishing",
            TaskGroup::Docker => "docker",
            TaskGroup::Distribution => "distribution",
        };
        f.write_str(name)
    }
}

/// タスクが実行する処理
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskAction {
    /// 依存タスクを束ねるだけで処理を持たない
    Lifecycle,
    /// 外部プロセスの起動（シェルを介さない）
    Exec {
        executable: String,
        #[serde(serialize_with = "serialize_redacted")]
        args: Vec<String>,
        ignore_exit_value: bool,
    },
    /// コピー元を `into` に同期（`into` は事前に空にされる）
    Sync {
        sources: Vec<CopySource>,
        into: PathBuf,
    },
    /// ファイルを書き出す
    WriteFile { path: PathBuf, contents: String },
}

impl TaskAction {
    /// `docker <args>` を実行するアクション
    pub fn docker(args: Vec<String>) -> Self {
        TaskAction::Exec {
            executable: "docker".to_string(),
            args,
            ignore_exit_value: false,
        }
    }

    /// 表示用のコマンドライン（パスワードは伏せる）
    pub fn display_command(&self) -> Option<String> {
        let TaskAction::Exec {
            executable, args, ..
        } = self
        else {
            return None;
        };

        let mut parts = vec![executable.clone()];
        parts.extend(redact_args(args));
        Some(parts.join(" "))
    }
}

/// `-p` / `--password` の直後の値を伏せた引数列
fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut redact_next = false;
    for arg in args {
        if redact_next {
            redacted.push("******".to_string());
            redact_next = false;
            continue;
        }
        redact_next = arg == "-p" || arg == "--password";
        redacted.push(arg.clone());
    }
    redacted
}

fn serialize_redacted<S: Serializer>(
    args: &[String],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    redact_args(args).serialize(serializer)
}

/// グラフのノード
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub name: String,
    pub group: Option<TaskGroup>,
    pub description: Option<String>,
    pub action: TaskAction,
    pub depends_on: Vec<String>,
}

impl Task {
    pub fn new(name: impl Into<String>, action: TaskAction) -> Self {
        Self {
            name: name.into(),
            group: None,
            description: None,
            action,
            depends_on: Vec::new(),
        }
    }

    /// 処理を持たない集約タスク
    pub fn lifecycle(name: impl Into<String>) -> Self {
        Self::new(name, TaskAction::Lifecycle)
    }

    pub fn group(mut self, group: TaskGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn depending_on(mut self, dependency: impl Into<String>) -> Self {
        self.depends_on(dependency);
        self
    }

    /// 依存を追加（重複は無視）
    pub fn depends_on(&mut self, dependency: impl Into<String>) -> &mut Self {
        let dependency = dependency.into();
        if !self.depends_on.contains(&dependency) {
            self.depends_on.push(dependency);
        }
        self
    }
}

/// 登録順を保持するタスクの集合
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいタスクを登録（同名があればエラー）
    pub fn register(&mut self, task: Task) -> Result<&mut Task> {
        if self.index.contains_key(&task.name) {
            return Err(BuildError::DuplicateTask(task.name));
        }
        Ok(self.insert(task))
    }

    /// タスクを取得、なければ `create` で作成して登録
    ///
    /// 既に存在する場合 `create` は呼ばれず、既存のタスクが返ります。
    pub fn get_or_register(&mut self, name: &str, create: impl FnOnce() -> Task) -> &mut Task {
        if let Some(&index) = self.index.get(name) {
            tracing::trace!(task = name, "Task already registered");
            return &mut self.tasks[index];
        }
        let mut task = create();
        task.name = name.to_string();
        self.insert(task)
    }

    fn insert(&mut self, task: Task) -> &mut Task {
        tracing::debug!(task = %task.name, "Registering task");
        let index = self.tasks.len();
        self.index.insert(task.name.clone(), index);
        self.tasks.push(task);
        &mut self.tasks[index]
    }

    /// `task` が `dependency` に依存することを宣言
    pub fn depends_on(&mut self, task: &str, dependency: &str) -> Result<()> {
        self.get_mut(task)
            .ok_or_else(|| BuildError::TaskNotFound(task.to_string()))?
            .depends_on(dependency);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.index.get(name).map(|&i| &mut self.tasks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 登録順のタスク
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// `task` から依存をたどって `dependency` に到達できるか
    pub fn reaches(&self, task: &str, dependency: &str) -> bool {
        let mut stack = vec![task];
        let mut seen: Vec<&str> = Vec::new();
        while let Some(current) = stack.pop() {
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            if let Some(t) = self.get(current) {
                for dep in &t.depends_on {
                    if dep == dependency {
                        return true;
                    }
                    stack.push(dep.as_str());
                }
            }
        }
        false
    }

    /// 対象タスクの実行順（依存が先、各タスク1回）
    pub fn execution_order<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<&Task>> {
        let mut state: HashMap<&str, Visit> = HashMap::new();
        let mut order = Vec::new();
        let mut path = Vec::new();

        for target in targets {
            self.visit(target.as_ref(), &mut state, &mut path, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &str,
        state: &mut HashMap<&'a str, Visit>,
        path: &mut Vec<String>,
        order: &mut Vec<&'a Task>,
    ) -> Result<()> {
        let task = self
            .get(name)
            .ok_or_else(|| BuildError::TaskNotFound(name.to_string()))?;

        match state.get(task.name.as_str()) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::InProgress) => {
                let start = path.iter().position(|n| n == name).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(name.to_string());
                return Err(BuildError::CircularDependency(cycle));
            }
            None => {}
        }

        state.insert(task.name.as_str(), Visit::InProgress);
        path.push(task.name.clone());
        for dep in &task.depends_on {
            self.visit(dep, state, path, order)?;
        }
        path.pop();
        state.insert(task.name.as_str(), Visit::Done);
        order.push(task);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}
