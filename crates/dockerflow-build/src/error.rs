use dockerflow_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    #[error("Circular task dependency: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    #[error("{kind} names '{first}' and '{second}' both map to task segment '{segment}'")]
    TaskNameCollision {
        kind: &'static str,
        first: String,
        second: String,
        segment: String,
    },

    #[error("Image/registry pairs '{first}' and '{second}' both generate task '{task}'")]
    PairTaskCollision {
        first: String,
        second: String,
        task: String,
    },

    #[error("{kind} name '{name}' does not produce a task name segment")]
    EmptyTaskSegment { kind: &'static str, name: String },

    #[error("Copy source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Task '{task}' failed with {}", exit_description(.code))]
    ProcessFailed { task: String, code: Option<i32> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::TaskNotFound(name) => {
                format!(
                    "タスクが見つかりません: {}\n\
                     \n\
                     `dockerflow tasks --all` で利用可能なタスクを確認してください。",
                    name
                )
            }
            BuildError::TaskNameCollision {
                first,
                second,
                segment,
                ..
            } => {
                format!(
                    "'{}' と '{}' は同じタスク名 '{}' になります\n\
                     \n\
                     解決方法:\n\
                     どちらかの名前を変更してください（区切り文字と大文字小文字は区別されません）",
                    first, second, segment
                )
            }
            BuildError::PairTaskCollision {
                first,
                second,
                task,
            } => {
                format!(
                    "イメージとレジストリの組 '{}' と '{}' は同じタスク名 '{}' になります\n\
                     \n\
                     解決方法:\n\
                     イメージ名かレジストリ名に 'to' を含めないようにしてください",
                    first, second, task
                )
            }
            BuildError::SourceNotFound(path) => {
                format!(
                    "コピー元が見つかりません: {}\n\
                     \n\
                     docker.kdl の files ブロックのパスを確認してください。\n\
                     生成物の場合は先にビルドしてください。",
                    path.display()
                )
            }
            BuildError::Spawn { program, .. } => {
                format!(
                    "'{}' を起動できませんでした\n\
                     \n\
                     解決方法:\n\
                     • Docker CLI がインストールされ PATH に含まれているか確認してください",
                    program
                )
            }
            BuildError::ProcessFailed { task, code } => {
                format!(
                    "タスク '{}' が失敗しました（{}）\n\
                     \n\
                     上に表示された docker の出力を確認してください。",
                    task,
                    exit_description(code)
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
