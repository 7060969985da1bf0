use crate::models::{Language, LanguageConfig, ToolInvocation};

pub struct DefaultConfig;

impl DefaultConfig {
    /// 列出文件时额外忽略的规则
    pub fn default_files_ignore() -> Vec<String> {
        vec!["bun.lock".to_string()]
    }

    /// 检查时额外忽略的规则
    pub fn default_lint_ignore() -> Vec<String> {
        vec![
            ".opencode".to_string(),
            "bun.lock".to_string(),
            ".gitignore".to_string(),
        ]
    }

    /// 格式化时额外忽略的规则
    pub fn default_format_ignore() -> Vec<String> {
        vec![
            ".opencode/.gitignore".to_string(),
            ".opencode/package.json".to_string(),
            "bun.lock".to_string(),
            ".gitignore".to_string(),
        ]
    }

    /// 默认的文件类别与工具表
    pub fn default_languages() -> Vec<LanguageConfig> {
        let prettier = || vec![ToolInvocation::new("prettier", &["--write", "{file}"])];
        let eslint = || vec![ToolInvocation::new("eslint", &["{file}"])];

        vec![
            LanguageConfig {
                lang: Language::TypeScript,
                extensions: exts(&[".ts", ".tsx"]),
                format: prettier(),
                lint: vec![
                    ToolInvocation::new("eslint", &["{file}"]),
                    ToolInvocation::new(
                        "tsc",
                        &[
                            "--noEmit",
                            "--skipLibCheck",
                            "--module",
                            "esnext",
                            "--target",
                            "esnext",
                            "--lib",
                            "esnext,dom",
                            "--moduleResolution",
                            "bundler",
                            "--downlevelIteration",
                            "{file}",
                        ],
                    ),
                ],
            },
            LanguageConfig {
                lang: Language::JavaScript,
                extensions: exts(&[".js", ".jsx", ".mjs", ".cjs"]),
                format: prettier(),
                lint: eslint(),
            },
            LanguageConfig {
                lang: Language::Astro,
                extensions: exts(&[".astro"]),
                format: vec![ToolInvocation::new(
                    "prettier",
                    &["--write", "--plugin", "prettier-plugin-astro", "{file}"],
                )],
                lint: eslint(),
            },
            LanguageConfig {
                lang: Language::Json,
                extensions: exts(&[".json"]),
                format: prettier(),
                lint: eslint(),
            },
            LanguageConfig {
                lang: Language::Markdown,
                extensions: exts(&[".md"]),
                format: prettier(),
                lint: vec![ToolInvocation::new("markdownlint-cli2", &["{file}"])],
            },
            LanguageConfig {
                lang: Language::Yaml,
                extensions: exts(&[".yaml", ".yml"]),
                format: prettier(),
                lint: vec![ToolInvocation::new("yq", &["eval", "{file}"])],
            },
            LanguageConfig {
                lang: Language::Toml,
                extensions: exts(&[".toml"]),
                format: vec![ToolInvocation::new("taplo", &["fmt", "{file}"])],
                lint: vec![ToolInvocation::new("taplo", &["check", "{file}"])],
            },
            LanguageConfig {
                lang: Language::Css,
                extensions: exts(&[".css"]),
                format: prettier(),
                lint: vec![ToolInvocation::new("stylelint", &["{file}"])],
            },
            LanguageConfig {
                lang: Language::Html,
                extensions: exts(&[".html"]),
                format: prettier(),
                lint: vec![ToolInvocation::new("html-validate", &["{file}"])],
            },
            LanguageConfig {
                lang: Language::Bash,
                extensions: exts(&[".sh", ".bash"]),
                format: vec![ToolInvocation::new("shfmt", &["-w", "{file}"])],
                lint: vec![ToolInvocation::new("shellcheck", &["{file}"])],
            },
            LanguageConfig {
                lang: Language::Fish,
                extensions: exts(&[".fish"]),
                format: vec![ToolInvocation::new("fish_indent", &["--write", "{file}"])],
                lint: Vec::new(),
            },
            LanguageConfig {
                lang: Language::Dockerfile,
                extensions: exts(&[".dockerfile", ".containerfile"]),
                format: vec![ToolInvocation::new("dockerfmt", &["--write", "{file}"])],
                lint: Vec::new(),
            },
            LanguageConfig {
                lang: Language::Caddyfile,
                extensions: exts(&["Caddyfile"]),
                format: Vec::new(),
                lint: vec![ToolInvocation::new("caddy", &["validate", "--config", "{file}"])],
            },
            // 没有可用的格式化工具
            LanguageConfig {
                lang: Language::Kdl,
                extensions: exts(&[".kdl"]),
                format: Vec::new(),
                lint: Vec::new(),
            },
        ]
    }
}

fn exts(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}
