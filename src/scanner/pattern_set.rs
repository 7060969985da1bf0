use std::path::Path;

use tokio::fs;

use crate::error::{Error, Result};
use crate::scanner::pattern::Pattern;

/// 始终生效的内置排除规则
pub const BUILTIN_PATTERNS: &[&str] = &[".git/"];

/// 缺失 `.gitignore` 时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GitignorePolicy {
    /// 缺失或无法读取时报错
    #[default]
    Required,

    /// 缺失时视为没有额外规则
    Optional,
}

/// 忽略规则集合 - 任一规则命中即排除
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// 由规则文本直接构建（不读取文件）
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: sources
                .into_iter()
                .map(|source| Pattern::new(source.as_ref()))
                .collect(),
        }
    }

    /// 加载根目录的忽略规则：内置规则 + 调用方规则 + `.gitignore`
    pub async fn load(root: &Path, extra_patterns: &[String]) -> Result<Self> {
        Self::load_with(root, extra_patterns, GitignorePolicy::Required).await
    }

    /// 按指定策略加载忽略规则
    pub async fn load_with(
        root: &Path,
        extra_patterns: &[String],
        policy: GitignorePolicy,
    ) -> Result<Self> {
        let gitignore_path = root.join(".gitignore");

        let gitignore_lines = match fs::read_to_string(&gitignore_path).await {
            Ok(content) => parse_gitignore(&content),
            Err(err)
                if policy == GitignorePolicy::Optional
                    && err.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!("未找到 {}，不加载额外规则", gitignore_path.display());
                Vec::new()
            }
            Err(source) => {
                return Err(Error::Configuration {
                    path: gitignore_path,
                    source,
                })
            }
        };

        let sources = BUILTIN_PATTERNS
            .iter()
            .map(|s| s.to_string())
            .chain(extra_patterns.iter().cloned())
            .chain(gitignore_lines);

        let set = Self::new(sources);
        tracing::debug!("已加载 {} 条忽略规则: {}", set.len(), root.display());

        Ok(set)
    }

    /// 检查相对路径是否被忽略
    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    /// 返回第一条命中的规则
    pub fn matching_pattern(&self, path: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|pattern| pattern.matches(path))
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// 解析 `.gitignore` 内容：去除空白、空行和注释行
pub fn parse_gitignore(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// 将路径转为相对根目录、`/` 分隔的字符串，供规则匹配使用
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let key = relative.to_string_lossy();

    if std::path::MAIN_SEPARATOR == '/' {
        key.into_owned()
    } else {
        key.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// 将命令行给出的路径转为匹配用的键
///
/// 以根目录开头的路径去掉根目录前缀，其余相对路径视为相对根目录。
pub fn ignore_key(root: &Path, path: &Path) -> String {
    let root = root.strip_prefix(".").unwrap_or(root);
    let path = path.strip_prefix(".").unwrap_or(path);

    // 根目录是相对路径时，绝对路径需对照规范化后的根目录
    if path.is_absolute() && !root.is_absolute() {
        let base = if root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            root
        };
        if let Ok(canonical) = std::fs::canonicalize(base) {
            return relative_key(&canonical, path);
        }
    }

    relative_key(root, path)
}
