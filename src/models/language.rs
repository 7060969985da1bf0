use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::operations::command_runner::shell_quote;

/// 参数模板中代表目标文件的占位符
pub const FILE_PLACEHOLDER: &str = "{file}";

/// 可识别的文件类别，配置中出现其他类别会在加载时报错
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Astro,
    Json,
    Markdown,
    Yaml,
    Toml,
    Css,
    Html,
    Bash,
    Fish,
    Dockerfile,
    Caddyfile,
    Kdl,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Astro => "astro",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Css => "css",
            Language::Html => "html",
            Language::Bash => "bash",
            Language::Fish => "fish",
            Language::Dockerfile => "dockerfile",
            Language::Caddyfile => "caddyfile",
            Language::Kdl => "kdl",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 对文件执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Lint,
    Format,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Lint => f.write_str("lint"),
            Action::Format => f.write_str("format"),
        }
    }
}

/// 一次外部工具调用：程序名 + 参数模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// 程序名或路径，支持 `~/` 前缀
    pub program: String,

    /// 参数模板，`{file}` 会被替换为目标文件路径
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// 展开 `~/` 后的程序路径
    pub fn resolved_program(&self) -> String {
        expand_home(&self.program)
    }

    /// 参数模板中是否引用了目标文件
    pub fn references_file(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(FILE_PLACEHOLDER))
    }

    /// 为指定文件渲染转义后的命令行
    pub fn render(&self, file: &Path) -> String {
        let file = file.to_string_lossy();
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(shell_quote(&self.resolved_program()));

        for arg in &self.args {
            let arg = expand_home(arg);
            parts.push(shell_quote(&arg.replace(FILE_PLACEHOLDER, &file)));
        }

        parts.join(" ")
    }
}

/// 单个文件类别的工具配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub lang: Language,

    /// `.` 开头的条目按文件名后缀匹配，其余条目按完整文件名匹配（如 `Caddyfile`）
    pub extensions: Vec<String>,

    /// 格式化步骤，按顺序执行，遇到失败即停止
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<ToolInvocation>,

    /// 检查步骤，按顺序执行，遇到失败即停止
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lint: Vec<ToolInvocation>,
}

impl LanguageConfig {
    /// 检查文件是否属于此类别
    pub fn matches(&self, path: &Path) -> bool {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.extensions.iter().any(|entry| {
            if entry.starts_with('.') {
                file_name.len() > entry.len() && file_name.ends_with(entry.as_str())
            } else {
                file_name == entry
            }
        })
    }

    /// 获取指定动作的工具步骤
    pub fn steps(&self, action: Action) -> &[ToolInvocation] {
        match action {
            Action::Lint => &self.lint,
            Action::Format => &self.format,
        }
    }

    /// 将步骤渲染为单条 shell 命令，步骤之间以 `&&` 连接
    pub fn command_for(&self, action: Action, file: &Path) -> Option<String> {
        let steps = self.steps(action);
        if steps.is_empty() {
            return None;
        }

        Some(
            steps
                .iter()
                .map(|step| step.render(file))
                .collect::<Vec<_>>()
                .join(" && "),
        )
    }
}

/// 在类别表中查找文件对应的配置
pub fn find_language<'a>(languages: &'a [LanguageConfig], path: &Path) -> Option<&'a LanguageConfig> {
    languages.iter().find(|config| config.matches(path))
}

fn expand_home(value: &str) -> String {
    match value.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest).to_string_lossy().to_string(),
            None => value.to_string(),
        },
        None => value.to_string(),
    }
}
