use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::defaults::DefaultConfig;
use crate::error::{Error, Result};
use crate::models::{Action, LanguageConfig};
use crate::scanner::GitignorePolicy;

/// 项目内配置文件名
pub const PROJECT_CONFIG_FILE: &str = ".devfiles.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// 忽略配置
    #[serde(default)]
    pub ignore: IgnoreConfig,

    /// 运行配置
    #[serde(default)]
    pub run: RunConfig,

    /// 文件类别与工具表
    #[serde(default = "DefaultConfig::default_languages")]
    pub languages: Vec<LanguageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// 缺少 `.gitignore` 时是否报错
    pub require_gitignore: bool,

    /// `files` 命令额外忽略的规则
    pub files: Vec<String>,

    /// `lint` 命令额外忽略的规则
    pub lint: Vec<String>,

    /// `format` 命令额外忽略的规则
    pub format: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 执行工具时是否显示进度条
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore: IgnoreConfig::default(),
            run: RunConfig::default(),
            languages: DefaultConfig::default_languages(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            require_gitignore: true,
            files: DefaultConfig::default_files_ignore(),
            lint: DefaultConfig::default_lint_ignore(),
            format: DefaultConfig::default_format_ignore(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

impl Config {
    /// 从文件加载配置并校验
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 用户级配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("devfiles");
        path.push("config.toml");
        Some(path)
    }

    /// 项目内配置文件路径
    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_CONFIG_FILE)
    }

    /// 按优先级查找配置文件：显式路径 > 项目配置 > 用户配置
    pub fn resolve_path(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let project = Self::project_config_path(root);
        if project.is_file() {
            return Some(project);
        }

        Self::default_config_path().filter(|path| path.is_file())
    }

    /// 加载配置，找不到配置文件时使用内置默认值
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        match Self::resolve_path(root, explicit) {
            Some(path) => {
                tracing::debug!("加载配置: {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::debug!("未找到配置文件，使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 校验文件类别表
    pub fn validate(&self) -> Result<()> {
        let mut langs = HashSet::new();
        let mut entries = HashSet::new();

        for language in &self.languages {
            if !langs.insert(language.lang) {
                return Err(Error::InvalidConfig(format!("重复的文件类别: {}", language.lang)));
            }

            if language.extensions.is_empty() {
                return Err(Error::InvalidConfig(format!("{} 未指定任何扩展名", language.lang)));
            }

            for entry in &language.extensions {
                if entry.trim().is_empty() || entry == "." || entry.contains('/') {
                    return Err(Error::InvalidConfig(format!(
                        "{} 的扩展名无效: {:?}",
                        language.lang, entry
                    )));
                }
                if !entries.insert(entry.as_str()) {
                    return Err(Error::InvalidConfig(format!(
                        "扩展名 {} 被多个类别使用",
                        entry
                    )));
                }
            }

            for action in [Action::Lint, Action::Format] {
                for step in language.steps(action) {
                    if step.program.trim().is_empty() {
                        return Err(Error::InvalidConfig(format!(
                            "[{}]({}) 的程序名为空",
                            language.lang, action
                        )));
                    }
                    if !step.references_file() {
                        return Err(Error::InvalidConfig(format!(
                            "[{}]({}) {} 的参数中缺少 {{file}} 占位符",
                            language.lang, action, step.program
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// `.gitignore` 缺失策略
    pub fn gitignore_policy(&self) -> GitignorePolicy {
        if self.ignore.require_gitignore {
            GitignorePolicy::Required
        } else {
            GitignorePolicy::Optional
        }
    }

    /// 指定动作的额外忽略规则
    pub fn extra_patterns(&self, action: Option<Action>) -> &[String] {
        match action {
            Some(Action::Lint) => &self.ignore.lint,
            Some(Action::Format) => &self.ignore.format,
            None => &self.ignore.files,
        }
    }
}
