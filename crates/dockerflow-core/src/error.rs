use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("{kind} '{name}' は既に登録されています")]
    DuplicateName { kind: &'static str, name: String },

    #[error(
        "プロジェクトルートが見つかりません\n探索開始位置: {0}\nヒント: docker.kdl ファイルを含むディレクトリで実行してください"
    )]
    ProjectRootNotFound(PathBuf),

    #[error("イメージが見つかりません: {0}")]
    ImageNotFound(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
