//! 遅延評価される設定値

use serde::Serialize;

/// 規約値（デフォルト）と明示値を持つ設定プロパティ
///
/// 設定フェーズでは何度でも上書きでき（最後の書き込みが勝つ）、
/// 値の解決はタスクグラフ展開時に一度だけ行われます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property<T> {
    value: Option<T>,
    convention: Option<T>,
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Self {
            value: None,
            convention: None,
        }
    }
}

impl<T> Property<T> {
    /// 規約値付きのプロパティを作成
    pub fn with_convention(convention: T) -> Self {
        Self {
            value: None,
            convention: Some(convention),
        }
    }

    /// 明示値を設定
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// 規約値を差し替え（明示値は維持）
    pub fn convention(&mut self, convention: T) {
        self.convention = Some(convention);
    }

    /// 明示値、なければ規約値
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref().or(self.convention.as_ref())
    }
}

impl<T: Clone> Property<T> {
    /// 値を解決し、どちらもなければ `fallback` を評価する
    pub fn get_or_else(&self, fallback: impl FnOnce() -> T) -> T {
        self.get().cloned().unwrap_or_else(fallback)
    }
}
