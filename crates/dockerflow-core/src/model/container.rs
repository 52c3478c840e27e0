//! 名前付きコレクション

use crate::error::{ConfigError, Result};
use serde::Serialize;

/// 名前で識別される要素
pub trait Named {
    /// エラーメッセージ用の種別名
    const KIND: &'static str;

    /// 名前だけを指定して既定値で作成
    fn create(name: &str) -> Self;

    fn name(&self) -> &str;
}

/// 登録順を保持する、名前が一意なコレクション
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct NamedContainer<T> {
    items: Vec<T>,
}

impl<T> Default for NamedContainer<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Named> NamedContainer<T> {
    /// 新しい要素を登録（同名があればエラー）
    pub fn register(&mut self, name: &str) -> Result<&mut T> {
        if self.contains(name) {
            return Err(ConfigError::DuplicateName {
                kind: T::KIND,
                name: name.to_string(),
            });
        }
        self.items.push(T::create(name));
        let index = self.items.len() - 1;
        Ok(&mut self.items[index])
    }

    /// 要素を取得、なければ作成してから `configure` を適用
    ///
    /// 既存の要素にも `configure` を再適用するため、同じ呼び出しを
    /// 繰り返すと要素が増えずに設定が上書きされます。
    pub fn get_or_create(&mut self, name: &str, configure: impl FnOnce(&mut T)) -> &mut T {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                tracing::debug!(kind = T::KIND, name, "Registering new entry");
                self.items.push(T::create(name));
                self.items.len() - 1
            }
        };
        let item = &mut self.items[index];
        configure(item);
        item
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| item.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// 登録順のイテレータ
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Named::name).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name() == name)
    }
}

impl<'a, T> IntoIterator for &'a NamedContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
