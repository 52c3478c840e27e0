//! ビルドコンテキストの同期
//!
//! コピー元を準備ディレクトリへ集めます。準備ディレクトリは毎回作り直されるため、
//! 以前の実行で残ったファイルがコンテキストに混ざることはありません。

use crate::error::{BuildError, Result};
use dockerflow_core::CopySource;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 同期結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub files: usize,
    pub bytes: u64,
}

/// コピー元を `into` に同期
///
/// - ディレクトリ: 中身を再帰的に `into` 直下へコピー（include/exclude を適用）
/// - ファイル: `into` 直下へコピー（`rename` があればその名前で）
///
/// 後のコピー元が同じパスを書いた場合は上書きされます。
pub fn sync_sources(sources: &[CopySource], into: &Path) -> Result<SyncSummary> {
    if into.exists() {
        fs::remove_dir_all(into)?;
    }
    fs::create_dir_all(into)?;

    let mut summary = SyncSummary::default();
    for source in sources {
        let from = &source.from;
        if from.is_dir() {
            let filter = Filter::new(source)?;
            copy_dir(from, into, &filter, &mut summary)?;
        } else if from.is_file() {
            let file_name = match &source.rename {
                Some(name) => PathBuf::from(name),
                None => PathBuf::from(from.file_name().ok_or_else(|| {
                    BuildError::SourceNotFound(from.clone())
                })?),
            };
            copy_file(from, &into.join(file_name), &mut summary)?;
        } else {
            return Err(BuildError::SourceNotFound(from.clone()));
        }
    }

    tracing::debug!(
        into = %into.display(),
        files = summary.files,
        bytes = summary.bytes,
        "Synced build context"
    );
    Ok(summary)
}

fn copy_dir(from: &Path, into: &Path, filter: &Filter, summary: &mut SyncSummary) -> Result<()> {
    // シンボリックリンクはたどらない（ループするリンクでも停止する）
    let walker = WalkDir::new(from)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        // ファイルを指すリンクだけは中身をコピーする
        if file_type.is_symlink() && !path.is_file() {
            tracing::debug!(path = %path.display(), "Skipping symlink");
            continue;
        }

        let relative = path.strip_prefix(from).unwrap_or(path);
        if filter.accepts(relative) {
            copy_file(path, &into.join(relative), summary)?;
        }
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path, summary: &mut SyncSummary) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    summary.bytes += fs::copy(from, to)?;
    summary.files += 1;
    Ok(())
}

/// include / exclude のglobフィルタ
///
/// パターンは相対パスとファイル名の両方に照合します。
struct Filter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Filter {
    fn new(source: &CopySource) -> Result<Self> {
        Ok(Self {
            include: compile(&source.include)?,
            exclude: compile(&source.exclude)?,
        })
    }

    fn accepts(&self, relative: &Path) -> bool {
        let included = self.include.is_empty() || matches_any(&self.include, relative);
        included && !matches_any(&self.exclude, relative)
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| BuildError::InvalidPattern {
                pattern: p.clone(),
                message: e.msg.to_string(),
            })
        })
        .collect()
}

fn matches_any(patterns: &[Pattern], relative: &Path) -> bool {
    let file_name = relative.file_name().map(Path::new);
    patterns.iter().any(|pattern| {
        pattern.matches_path(relative) || file_name.is_some_and(|name| pattern.matches_path(name))
    })
}
