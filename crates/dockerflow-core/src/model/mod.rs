//! モデル定義
//!
//! dockerflow で使用されるデータモデルを定義します。
//! 各モデルは機能ごとにモジュールに分離されています。

mod container;
mod extension;
mod files;
mod image;
mod project;
mod property;
mod registry;

// Re-exports
pub use container::*;
pub use extension::*;
pub use files::*;
pub use image::*;
pub use project::*;
pub use property::*;
pub use registry::*;
