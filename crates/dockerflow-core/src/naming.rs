//! タスク名・タグ文字列の生成ユーティリティ

use regex::Regex;
use std::sync::LazyLock;

static SEGMENT_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\-_./]+").expect("static delimiter pattern is valid")
});

/// 名前をタスク名の一部（CamelCase）に変換
///
/// 空白・ハイフン・アンダースコア・ドット・スラッシュの連続で分割し、
/// 各セグメントを小文字化してから先頭だけ大文字にして連結します。
///
/// # Examples
/// - `my-app` -> `MyApp`
/// - `ghcr` -> `Ghcr`
/// - `dockerHub` -> `Dockerhub`
pub fn to_task_segment(raw: &str) -> String {
    SEGMENT_DELIMITER
        .split(raw)
        .filter(|segment| !segment.is_empty())
        .map(capitalize_lowercased)
        .collect()
}

fn capitalize_lowercased(segment: &str) -> String {
    let lower = segment.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 動詞プレフィックスと名前からタスク名を生成
///
/// `task_name("dockerBuild", "my-app")` -> `dockerBuildMyApp`
pub fn task_name(prefix: &str, raw: &str) -> String {
    format!("{}{}", prefix, to_task_segment(raw))
}

/// 末尾が `/` でなければ付与する（冪等）
pub fn ensure_trailing_slash(s: &str) -> String {
    if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{}/", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_task_segment_delimiters() {
        assert_eq!(to_task_segment("my-app"), "MyApp");
        assert_eq!(to_task_segment("my.app"), "MyApp");
        assert_eq!(to_task_segment("my app"), "MyApp");
        assert_eq!(to_task_segment("my_app"), "MyApp");
        assert_eq!(to_task_segment("my/app"), "MyApp");
    }

    #[test]
    fn test_to_task_segment_collapses_runs_and_edges() {
        assert_eq!(to_task_segment("--my__app.."), "MyApp");
        assert_eq!(to_task_segment("  main  "), "Main");
        assert_eq!(to_task_segment(""), "");
        assert_eq!(to_task_segment("-_./"), "");
    }

    #[test]
    fn test_to_task_segment_lowercases_rest() {
        // 単一セグメント内の大文字は保持されない
        assert_eq!(to_task_segment("dockerHub"), "Dockerhub");
        assert_eq!(to_task_segment("MAIN"), "Main");
        assert_eq!(to_task_segment("api-V2"), "ApiV2");
    }

    #[test]
    fn test_task_name() {
        assert_eq!(task_name("dockerBuild", "main"), "dockerBuildMain");
        assert_eq!(task_name("dockerRun", "web-api"), "dockerRunWebApi");
    }

    #[test]
    fn test_ensure_trailing_slash() {
        assert_eq!(ensure_trailing_slash("ghcr.io/user"), "ghcr.io/user/");
        assert_eq!(ensure_trailing_slash("ghcr.io/user/"), "ghcr.io/user/");
        assert_eq!(ensure_trailing_slash(""), "/");
    }

    #[test]
    fn test_ensure_trailing_slash_idempotent() {
        for s in ["", "/", "a", "a/", "ghcr.io/u", "registry//", "x y"] {
            let once = ensure_trailing_slash(s);
            assert_eq!(ensure_trailing_slash(&once), once, "input: {:?}", s);
        }
    }
}
