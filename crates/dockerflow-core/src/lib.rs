//! dockerflow core
//!
//! docker.kdl で宣言されたイメージとレジストリをモデル化し、
//! プロジェクトの発見・読み込みを行います。
//! タスクグラフへの展開は dockerflow-build が担当します。

pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;
pub mod naming;
pub mod parser;

pub use discovery::*;
pub use error::*;
pub use loader::*;
pub use model::*;
pub use naming::{ensure_trailing_slash, task_name, to_task_segment};
pub use parser::{apply_kdl_file, apply_kdl_string};
