use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::Result;
use crate::scanner::pattern_set::{relative_key, GitignorePolicy, PatternSet};

/// 文件遍历器 - 递归列出根目录下未被忽略的普通文件
pub struct FileWalker {
    root: PathBuf,
    patterns: Arc<PatternSet>,
}

impl FileWalker {
    /// 使用已加载的规则集合创建遍历器
    pub fn new(root: &Path, patterns: Arc<PatternSet>) -> Self {
        Self {
            root: root.to_path_buf(),
            patterns,
        }
    }

    /// 列出所有未被忽略的文件（路径以 root 开头）
    ///
    /// 被忽略的目录在遍历时直接剪枝，不会进入其中。
    pub async fn walk(&self) -> Result<Vec<PathBuf>> {
        let root = self.root.clone();
        let patterns = Arc::clone(&self.patterns);

        tokio::task::spawn_blocking(move || walk_blocking(&root, &patterns)).await?
    }
}

fn walk_blocking(root: &Path, patterns: &PatternSet) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // 根目录本身不参与匹配
            entry.depth() == 0 || !patterns.is_ignored(&relative_key(root, entry.path()))
        });

    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for entry in walker {
        let entry = entry?;

        // 符号链接与目录都不计入结果
        if !entry.file_type().is_file() {
            continue;
        }

        // 匹配用的字符串键可能有损，结果保留原始路径
        if seen.insert(entry.path().to_path_buf()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("遍历完成: {} 个文件 ({})", files.len(), root.display());
    Ok(files)
}

/// 列出根目录下所有未被忽略的文件
pub async fn get_all_files(root: &Path, extra_patterns: &[String]) -> Result<Vec<PathBuf>> {
    get_all_files_with(root, extra_patterns, GitignorePolicy::Required).await
}

/// 同 [`get_all_files`]，可指定 `.gitignore` 缺失时的策略
pub async fn get_all_files_with(
    root: &Path,
    extra_patterns: &[String],
    policy: GitignorePolicy,
) -> Result<Vec<PathBuf>> {
    // 先加载规则，`.gitignore` 缺失时在遍历前失败
    let patterns = PatternSet::load_with(root, extra_patterns, policy).await?;
    FileWalker::new(root, Arc::new(patterns)).walk().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::tempdir;

    fn create_file(root: &Path, path: &str) {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, "").unwrap();
    }

    fn relative_set(root: &Path, files: &[PathBuf]) -> HashSet<String> {
        files.iter().map(|f| relative_key(root, f)).collect()
    }

    #[tokio::test]
    async fn test_walk_filters_ignored_files() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        fs::write(root.join(".gitignore"), "node_modules/\ndist\n").unwrap();
        create_file(root, "src/a.ts");
        create_file(root, "node_modules/x/y.js");
        create_file(root, "dist/out.js");
        create_file(root, "bun.lock");
        create_file(root, "dist-tools/readme.md");
        create_file(root, ".git/HEAD");

        let extra = vec!["bun.lock".to_string(), ".gitignore".to_string()];
        let files = get_all_files(root, &extra).await.unwrap();

        let expected: HashSet<String> = ["src/a.ts", "dist-tools/readme.md"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(relative_set(root, &files), expected);
        assert!(files.iter().all(|f| f.starts_with(root)));
    }

    #[tokio::test]
    async fn test_walk_is_stable() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        fs::write(root.join(".gitignore"), "*.log\n").unwrap();
        create_file(root, "b/two.rs");
        create_file(root, "a/one.rs");
        create_file(root, "a/debug.log");

        let first = get_all_files(root, &[]).await.unwrap();
        let second = get_all_files(root, &[]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            relative_set(root, &first),
            [".gitignore", "a/one.rs", "b/two.rs"]
                .iter()
                .map(|s| s.to_string())
                .collect::<HashSet<_>>()
        );
    }

    #[tokio::test]
    async fn test_missing_gitignore_fails_before_walk() {
        let temp_dir = tempdir().unwrap();
        create_file(temp_dir.path(), "src/a.ts");

        let result = get_all_files(temp_dir.path(), &[]).await;

        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_optional_gitignore_walks_everything() {
        let temp_dir = tempdir().unwrap();
        create_file(temp_dir.path(), "src/a.ts");

        let files = get_all_files_with(temp_dir.path(), &[], GitignorePolicy::Optional)
            .await
            .unwrap();

        assert_eq!(files, vec![temp_dir.path().join("src/a.ts")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_excluded() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        fs::write(root.join(".gitignore"), "").unwrap();
        create_file(root, "real.txt");
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();

        let files = get_all_files(root, &[".gitignore".to_string()]).await.unwrap();

        assert_eq!(files, vec![root.join("real.txt")]);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_names_are_returned_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        fs::write(root.join(".gitignore"), "").unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.txt");
        fs::write(root.join(name), "").unwrap();

        let files = get_all_files(root, &[".gitignore".to_string()]).await.unwrap();

        assert_eq!(files, vec![root.join(name)]);
        assert!(files[0].exists());
    }
}
