use std::fmt;

use regex::Regex;

/// 单条忽略规则 - gitignore 语法子集
///
/// 支持前导 `/`（相对根目录）、末尾 `/`（目录规则）、`*`、`**` 和 `?`。
/// 任意字符串都是合法规则，无法识别的通配语法按字面量匹配。
#[derive(Debug, Clone)]
pub struct Pattern {
    /// 原始规则文本
    source: String,

    /// 是否以 `/` 结尾
    directory: bool,

    /// 是否以 `/` 开头
    root_relative: bool,

    /// 编译后的匹配器
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),

    /// 正则超出大小限制时退回的逐段字面量比较
    Literal(String),
}

impl Pattern {
    /// 将规则文本翻译为匹配器
    pub fn new(source: &str) -> Self {
        let directory = source.ends_with('/');
        let body = source.strip_suffix('/').unwrap_or(source);

        let root_relative = body.starts_with('/');
        let body = body.strip_prefix('/').unwrap_or(body);

        let translated = translate_glob(body);

        // 两种目录标记都追加 (/.*)?，以便同时命中目录下的所有内容
        let anchored = if root_relative {
            format!("^{}(/.*)?$", translated)
        } else {
            format!("(^|/){}(/.*)?$", translated)
        };

        let matcher = match Regex::new(&anchored) {
            Ok(regex) => Matcher::Regex(regex),
            Err(err) => {
                tracing::warn!("忽略规则 {} 无法编译为正则，按字面量匹配: {}", source, err);
                Matcher::Literal(body.to_string())
            }
        };

        Self {
            source: source.to_string(),
            directory,
            root_relative,
            matcher,
        }
    }

    /// 检查相对根目录的路径（`/` 分隔）是否被此规则命中
    pub fn matches(&self, path: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(path),
            Matcher::Literal(literal) => self.matches_literal(literal, path),
        }
    }

    fn matches_literal(&self, literal: &str, path: &str) -> bool {
        let covers = |tail: &str| {
            tail.strip_prefix(literal)
                .map(|rest| rest.is_empty() || rest.starts_with('/'))
                .unwrap_or(false)
        };

        if self.root_relative {
            return covers(path);
        }

        covers(path)
            || path
                .match_indices('/')
                .any(|(idx, _)| covers(&path[idx + 1..]))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_directory_pattern(&self) -> bool {
        self.directory
    }

    pub fn is_root_relative(&self) -> bool {
        self.root_relative
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// 将通配语法翻译为正则片段
///
/// `**` 先于 `*` 识别，避免被拆成两个单段通配。
fn translate_glob(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(".*");
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_matches_any_depth() {
        let pattern = Pattern::new("node_modules");

        assert!(pattern.matches("node_modules"));
        assert!(pattern.matches("node_modules/x/y.js"));
        assert!(pattern.matches("packages/web/node_modules/react/index.js"));
        assert!(!pattern.matches("my_node_modules/a.js"));
        assert!(!pattern.matches("src/node_modules_backup"));
    }

    #[test]
    fn test_plain_name_requires_exact_segment() {
        let pattern = Pattern::new("dist");

        assert!(pattern.matches("dist/out.js"));
        assert!(!pattern.matches("dist-tools/readme.md"));
        assert!(!pattern.matches("src/distance.ts"));
    }

    #[test]
    fn test_root_relative_only_matches_at_root() {
        let pattern = Pattern::new("/build");

        assert!(pattern.is_root_relative());
        assert!(pattern.matches("build"));
        assert!(pattern.matches("build/main.o"));
        assert!(!pattern.matches("src/build"));
        assert!(!pattern.matches("src/build/main.o"));
    }

    #[test]
    fn test_directory_pattern_flags() {
        let pattern = Pattern::new("/target/");

        assert!(pattern.is_directory_pattern());
        assert!(pattern.is_root_relative());
        assert!(pattern.matches("target/debug/app"));
        assert!(!pattern.matches("crates/core/target/debug/app"));
        assert_eq!(pattern.as_str(), "/target/");
    }

    #[test]
    fn test_single_star_does_not_cross_separator() {
        let pattern = Pattern::new("/src/*.ts");

        assert!(pattern.matches("src/a.ts"));
        assert!(!pattern.matches("src/lib/a.ts"));
    }

    #[test]
    fn test_double_star_crosses_separator() {
        let pattern = Pattern::new("/src/**/*.ts");

        assert!(pattern.matches("src/lib/a.ts"));
        assert!(pattern.matches("src/lib/deep/b.ts"));
        assert!(!pattern.matches("test/lib/a.ts"));
    }

    #[test]
    fn test_extension_glob_anywhere() {
        let pattern = Pattern::new("*.log");

        assert!(pattern.matches("debug.log"));
        assert!(pattern.matches("logs/2024/app.log"));
        assert!(!pattern.matches("debug.log.txt"));
    }

    #[test]
    fn test_question_mark_single_character() {
        let pattern = Pattern::new("file?.txt");

        assert!(pattern.matches("file1.txt"));
        assert!(pattern.matches("a/fileX.txt"));
        assert!(!pattern.matches("file12.txt"));
        assert!(!pattern.matches("file/.txt"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = Pattern::new("a.b+(c)");

        assert!(pattern.matches("a.b+(c)"));
        assert!(!pattern.matches("axb+(c)"));
        assert!(!pattern.matches("a.bb(c)"));
    }

    #[test]
    fn test_malformed_glob_degrades_to_literal() {
        let pattern = Pattern::new("[abc");

        assert!(pattern.matches("x/[abc"));
        assert!(!pattern.matches("a"));
    }

    #[test]
    fn test_nested_path_pattern() {
        let pattern = Pattern::new(".opencode/package.json");

        assert!(pattern.matches(".opencode/package.json"));
        assert!(!pattern.matches("package.json"));
        assert!(!pattern.matches(".opencode/other.json"));
    }
}
