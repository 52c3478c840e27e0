//! dockerflow のタスクグラフ展開と実行
//!
//! `dockerflow-core` で読み込んだイメージ・レジストリ設定から
//! docker build / buildx / push / run のタスクを宣言し、依存順に実行します。

pub mod compose;
pub mod dockerfile;
pub mod error;
pub mod executor;
pub mod graph;
pub mod jvm;
pub mod progress;
pub mod sync;

pub use compose::{
    BUILD_ALL, BUILDX_BUILD_ALL, BUILDX_PUSH_ALL, CREATE_BUILDX_BUILDER, LOGIN_ALL, PUSH_ALL,
    build_task_graph, compose,
};
pub use dockerfile::render_jvm_dockerfile;
pub use error::{BuildError, Result};
pub use executor::{ExecutionReport, Executor, TaskOutcome};
pub use graph::{Task, TaskAction, TaskGraph, TaskGroup};
pub use jvm::{apply_jvm_conventions, configure_jvm_application};
pub use progress::TaskProgress;
pub use sync::{SyncSummary, sync_sources};
