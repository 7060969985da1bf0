use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::operations::command_runner::{CommandRunner, ShellRunner};
use crate::scanner::pattern_set::{GitignorePolicy, PatternSet};

/// 相对 HEAD 新增、复制或修改的文件，NUL 分隔
pub const CHANGED_FILES_COMMAND: &str = "git diff -z --name-only --relative --diff-filter=ACM HEAD";

/// 未跟踪且未被 Git 自身忽略规则排除的文件，NUL 分隔
pub const UNTRACKED_FILES_COMMAND: &str = "git ls-files -z --others --exclude-standard";

/// Git 变更检测器 - 通过 git 子进程查询变更与未跟踪文件
pub struct GitChangeDetector<R = ShellRunner> {
    root: PathBuf,
    runner: R,
}

impl GitChangeDetector<ShellRunner> {
    pub fn new(root: &Path) -> Self {
        Self::with_runner(root, ShellRunner)
    }
}

impl<R: CommandRunner> GitChangeDetector<R> {
    pub fn with_runner(root: &Path, runner: R) -> Self {
        Self {
            root: root.to_path_buf(),
            runner,
        }
    }

    /// 查询变更文件与未跟踪文件，合并去重后按规则过滤
    pub async fn changed_files(&self, patterns: &PatternSet) -> Result<Vec<PathBuf>> {
        let changed = self.query(CHANGED_FILES_COMMAND).await?;
        let untracked = self.query(UNTRACKED_FILES_COMMAND).await?;

        let files = merge_file_lists(&self.root, [changed.as_str(), untracked.as_str()], patterns);
        tracing::debug!("Git 变更文件: {} 个 ({})", files.len(), self.root.display());

        Ok(files)
    }

    async fn query(&self, command: &str) -> Result<String> {
        let result = self.runner.run(command, &self.root).await;

        if !result.success {
            return Err(Error::VcsQuery {
                command: command.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        Ok(result.stdout)
    }
}

/// 合并多份 NUL 分隔的相对路径列表：保持首次出现顺序去重，再排除被忽略的路径
///
/// 路径按原样使用，不做空白裁剪（文件名可以包含空格和制表符）。
pub fn merge_file_lists<'a, I>(root: &Path, outputs: I, patterns: &PatternSet) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for output in outputs {
        for name in output.split('\0').filter(|name| !name.is_empty()) {
            if !seen.insert(name) {
                continue;
            }
            if patterns.is_ignored(name) {
                continue;
            }
            files.push(root.join(name));
        }
    }

    files
}

/// 列出相对 HEAD 变更的文件和未跟踪文件
pub async fn get_changed_files(root: &Path, extra_patterns: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = PatternSet::load(root, extra_patterns).await?;
    GitChangeDetector::new(root).changed_files(&patterns).await
}

/// 同 [`get_changed_files`]，可指定策略与命令执行器
pub async fn get_changed_files_with<R: CommandRunner>(
    root: &Path,
    extra_patterns: &[String],
    policy: GitignorePolicy,
    runner: R,
) -> Result<Vec<PathBuf>> {
    let patterns = PatternSet::load_with(root, extra_patterns, policy).await?;
    GitChangeDetector::with_runner(root, runner)
        .changed_files(&patterns)
        .await
}
