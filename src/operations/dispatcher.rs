use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::models::{find_language, Action, Language, LanguageConfig};
use crate::operations::command_runner::{CommandResult, CommandRunner, ShellRunner};

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RunMode {
    /// 只检查所有文件的工具配置，不执行任何命令
    Health,
    /// 对相对 HEAD 变更及未跟踪的文件执行工具
    Changed,
    /// 对所有文件执行工具
    All,
}

impl RunMode {
    /// 是否只需要 Git 变更文件
    pub fn changed_only(&self) -> bool {
        matches!(self, RunMode::Changed)
    }
}

/// 单个文件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// 没有匹配的文件类别
    NoConfig { file: PathBuf },

    /// 类别存在，但没有为当前动作配置工具
    NoTool { file: PathBuf, lang: Language },

    /// 工具程序不在 PATH 中
    MissingBinary {
        file: PathBuf,
        lang: Language,
        binary: String,
    },

    /// 配置完整但未执行（health 模式）
    Ready {
        file: PathBuf,
        lang: Language,
        command: String,
    },

    /// 已执行工具
    Ran {
        file: PathBuf,
        lang: Language,
        command: String,
        result: CommandResult,
    },
}

impl FileOutcome {
    pub fn file(&self) -> &Path {
        match self {
            FileOutcome::NoConfig { file }
            | FileOutcome::NoTool { file, .. }
            | FileOutcome::MissingBinary { file, .. }
            | FileOutcome::Ready { file, .. }
            | FileOutcome::Ran { file, .. } => file,
        }
    }
}

/// 一次运行的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_files: usize,
    pub ready: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// 进程退出码：有工具执行失败时为 1
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// 工具调度器 - 按文件类别为每个文件执行检查或格式化命令
pub struct Dispatcher<R = ShellRunner> {
    root: PathBuf,
    action: Action,
    languages: Vec<LanguageConfig>,
    runner: R,
    show_progress: bool,

    /// 程序是否存在的查询缓存
    binary_cache: HashMap<String, bool>,
}

impl Dispatcher<ShellRunner> {
    pub fn new(root: &Path, action: Action, languages: Vec<LanguageConfig>) -> Self {
        Self::with_runner(root, action, languages, ShellRunner)
    }
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn with_runner(root: &Path, action: Action, languages: Vec<LanguageConfig>, runner: R) -> Self {
        Self {
            root: root.to_path_buf(),
            action,
            languages,
            runner,
            show_progress: false,
            binary_cache: HashMap::new(),
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 处理所有文件
    ///
    /// `report` 收到需要展示给用户的结果：health 模式下是配置问题，其他模式下是执行结果。
    /// 单个文件失败不会中断后续文件。
    pub async fn run<F>(&mut self, mode: RunMode, files: &[PathBuf], mut report: F) -> RunSummary
    where
        F: FnMut(&FileOutcome),
    {
        let mut summary = RunSummary {
            total_files: files.len(),
            ..RunSummary::default()
        };

        // 创建进度条（在测试时禁用）
        let progress = if cfg!(test) || !self.show_progress || mode == RunMode::Health {
            ProgressBar::hidden()
        } else {
            create_progress_bar(files.len() as u64)
        };

        for file in files {
            progress.set_message(file.display().to_string());

            let outcome = self.process_file(mode, file).await;

            match &outcome {
                FileOutcome::Ran { result, .. } if result.success => summary.succeeded += 1,
                FileOutcome::Ran { .. } => summary.failed += 1,
                FileOutcome::Ready { .. } => summary.ready += 1,
                _ => summary.skipped += 1,
            }

            let visible = match &outcome {
                FileOutcome::Ran { .. } => true,
                FileOutcome::Ready { .. } => false,
                _ => mode == RunMode::Health,
            };
            if visible {
                progress.suspend(|| report(&outcome));
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        tracing::info!(
            "{} 完成: {} 个文件，成功 {}，失败 {}，跳过 {}",
            self.action,
            summary.total_files,
            summary.succeeded,
            summary.failed,
            summary.skipped
        );

        summary
    }

    async fn process_file(&mut self, mode: RunMode, file: &Path) -> FileOutcome {
        let config = match find_language(&self.languages, file) {
            Some(config) => config.clone(),
            None => {
                return FileOutcome::NoConfig {
                    file: file.to_path_buf(),
                }
            }
        };

        let steps = config.steps(self.action);
        if steps.is_empty() {
            return FileOutcome::NoTool {
                file: file.to_path_buf(),
                lang: config.lang,
            };
        }

        for step in steps {
            let binary = step.resolved_program();
            if !self.binary_exists(&binary) {
                return FileOutcome::MissingBinary {
                    file: file.to_path_buf(),
                    lang: config.lang,
                    binary,
                };
            }
        }

        // 命令在根目录下执行，参数使用相对根目录的路径
        let target = file.strip_prefix(&self.root).unwrap_or(file);
        let command = match config.command_for(self.action, target) {
            Some(command) => command,
            None => {
                return FileOutcome::NoTool {
                    file: file.to_path_buf(),
                    lang: config.lang,
                }
            }
        };

        if mode == RunMode::Health {
            return FileOutcome::Ready {
                file: file.to_path_buf(),
                lang: config.lang,
                command,
            };
        }

        let result = self.runner.run(&command, &self.root).await;
        if !result.success {
            tracing::debug!("[{}]({}) 失败 (退出码 {}): {}", config.lang, self.action, result.exit_code, command);
        }

        FileOutcome::Ran {
            file: file.to_path_buf(),
            lang: config.lang,
            command,
            result,
        }
    }

    /// 检查程序是否可执行：含路径分隔符的按相对根目录的路径检查，否则在 PATH 中查找
    fn binary_exists(&mut self, program: &str) -> bool {
        if let Some(&known) = self.binary_cache.get(program) {
            return known;
        }

        let exists = if program.contains('/') {
            self.root.join(program).is_file()
        } else {
            which::which(program).is_ok()
        };

        if !exists {
            tracing::debug!("未找到程序: {}", program);
        }

        self.binary_cache.insert(program.to_string(), exists);
        exists
    }
}

/// 创建进度条
fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    match ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} {msg}") {
        Ok(style) => pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])),
        Err(err) => tracing::debug!("进度条模板无效: {}", err),
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolInvocation;
    use std::fs;
    use tempfile::tempdir;

    fn language(lang: Language, ext: &str, lint: Vec<ToolInvocation>) -> LanguageConfig {
        LanguageConfig {
            lang,
            extensions: vec![ext.to_string()],
            format: Vec::new(),
            lint,
        }
    }

    fn fixture() -> (tempfile::TempDir, Vec<PathBuf>) {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        let files: Vec<PathBuf> = ["ok.md", "bad.sh", "notes.kdl", "Makefile", "style.css"]
            .iter()
            .map(|name| {
                let path = root.join(name);
                fs::write(&path, "content").unwrap();
                path
            })
            .collect();

        (temp_dir, files)
    }

    fn languages() -> Vec<LanguageConfig> {
        vec![
            language(Language::Markdown, ".md", vec![ToolInvocation::new("cat", &["{file}"])]),
            language(
                Language::Bash,
                ".sh",
                vec![ToolInvocation::new("sh", &["-c", "echo broken >&2; exit 2", "{file}"])],
            ),
            language(Language::Kdl, ".kdl", Vec::new()),
            language(
                Language::Css,
                ".css",
                vec![ToolInvocation::new("definitely-not-a-real-linter-xyz", &["{file}"])],
            ),
        ]
    }

    #[tokio::test]
    async fn test_health_mode_reports_issues_without_running() {
        let (temp_dir, files) = fixture();
        let mut dispatcher = Dispatcher::new(temp_dir.path(), Action::Lint, languages());

        let mut reported = Vec::new();
        let summary = dispatcher
            .run(RunMode::Health, &files, |outcome| reported.push(outcome.clone()))
            .await;

        assert_eq!(summary.total_files, 5);
        assert_eq!(summary.ready, 2);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(reported.len(), 3);

        assert!(reported.iter().any(|o| matches!(o, FileOutcome::NoConfig { file } if file.ends_with("Makefile"))));
        assert!(reported.iter().any(|o| matches!(o, FileOutcome::NoTool { lang: Language::Kdl, .. })));
        assert!(reported.iter().any(|o| matches!(
            o,
            FileOutcome::MissingBinary { binary, .. } if binary == "definitely-not-a-real-linter-xyz"
        )));

        // health 模式不执行命令
        assert!(!reported.iter().any(|o| matches!(o, FileOutcome::Ran { .. })));
    }

    #[tokio::test]
    async fn test_all_mode_runs_tools_and_continues_after_failure() {
        let (temp_dir, files) = fixture();
        let mut dispatcher = Dispatcher::new(temp_dir.path(), Action::Lint, languages());

        let mut reported = Vec::new();
        let summary = dispatcher
            .run(RunMode::All, &files, |outcome| reported.push(outcome.clone()))
            .await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.exit_code(), 1);

        // 非 health 模式只报告执行结果
        assert_eq!(reported.len(), 2);

        let markdown = reported
            .iter()
            .find(|o| matches!(o, FileOutcome::Ran { lang: Language::Markdown, .. }))
            .unwrap();
        if let FileOutcome::Ran { command, result, .. } = markdown {
            assert_eq!(command, "cat ok.md");
            assert!(result.success);
            assert_eq!(result.stdout, "content");
        }

        let bash = reported
            .iter()
            .find(|o| matches!(o, FileOutcome::Ran { lang: Language::Bash, .. }))
            .unwrap();
        if let FileOutcome::Ran { result, .. } = bash {
            assert!(!result.success);
            assert_eq!(result.exit_code, 2);
            assert_eq!(result.stderr, "broken");
        }
    }

    #[tokio::test]
    async fn test_format_action_uses_format_steps() {
        let (temp_dir, files) = fixture();
        let mut markdown = language(Language::Markdown, ".md", Vec::new());
        markdown.format = vec![ToolInvocation::new("cat", &["{file}"])];

        let mut dispatcher = Dispatcher::new(temp_dir.path(), Action::Format, vec![markdown]);
        let summary = dispatcher.run(RunMode::All, &files, |_| {}).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 4);
    }

    #[tokio::test]
    async fn test_relative_root_runs_tools_on_root_relative_paths() {
        // 临时目录建在当前目录下，根目录使用其相对路径
        let temp_dir = tempfile::Builder::new()
            .prefix("devfiles-relative-root")
            .tempdir_in(".")
            .unwrap();
        let root = PathBuf::from(temp_dir.path().file_name().unwrap());
        assert!(root.is_relative());

        fs::write(root.join(".gitignore"), "").unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.md"), "content").unwrap();

        let files = crate::scanner::get_all_files(&root, &[".gitignore".to_string()])
            .await
            .unwrap();
        assert_eq!(files, vec![root.join("src/a.md")]);

        let markdown = language(Language::Markdown, ".md", vec![ToolInvocation::new("cat", &["{file}"])]);
        let mut dispatcher = Dispatcher::new(&root, Action::Lint, vec![markdown]);

        let mut reported = Vec::new();
        let summary = dispatcher
            .run(RunMode::All, &files, |outcome| reported.push(outcome.clone()))
            .await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
        match &reported[..] {
            [FileOutcome::Ran { command, result, .. }] => {
                assert_eq!(command, "cat src/a.md");
                assert_eq!(result.stdout, "content");
            }
            other => panic!("期望一条执行结果，实际为 {:?}", other),
        }
    }

    #[test]
    fn test_outcome_file_accessor() {
        let outcome = FileOutcome::NoConfig {
            file: PathBuf::from("/repo/Makefile"),
        };

        assert_eq!(outcome.file(), Path::new("/repo/Makefile"));
        assert!(!RunMode::All.changed_only());
        assert!(RunMode::Changed.changed_only());
    }
}
