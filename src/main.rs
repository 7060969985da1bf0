mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, ConfigAction, OutputFormat};
use devfiles::config::Config;
use devfiles::models::Action;
use devfiles::operations::{Dispatcher, FileOutcome, RunMode};
use devfiles::scanner::{self, ignore_key, relative_key, PatternSet};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，输出到 stderr，避免干扰文件列表
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.clone();

    // 加载配置
    let config = Config::load(&root, cli.config.as_deref()).context("加载配置失败")?;

    let code = match cli.command {
        Commands::Files { changed, format } => {
            let files = enumerate(&root, &config, None, changed, &cli.ignore).await?;
            print_files(&root, &files, format)?;
            0
        }
        Commands::Lint { mode } => run_action(&root, &config, Action::Lint, mode, &cli.ignore).await?,
        Commands::Format { mode } => {
            run_action(&root, &config, Action::Format, mode, &cli.ignore).await?
        }
        Commands::CheckIgnore { paths } => {
            let extra = extra_patterns(&config, None, &cli.ignore);
            let patterns = PatternSet::load_with(&root, &extra, config.gitignore_policy())
                .await
                .context("加载忽略规则失败")?;
            check_ignore(&root, &patterns, &paths)
        }
        Commands::Config { action } => {
            manage_config(&root, &config, cli.config.as_deref(), action)?;
            0
        }
    };

    std::process::exit(code);
}

fn extra_patterns(config: &Config, action: Option<Action>, cli_ignore: &[String]) -> Vec<String> {
    config
        .extra_patterns(action)
        .iter()
        .chain(cli_ignore)
        .cloned()
        .collect()
}

/// 按模式枚举文件
async fn enumerate(
    root: &Path,
    config: &Config,
    action: Option<Action>,
    changed: bool,
    cli_ignore: &[String],
) -> Result<Vec<PathBuf>> {
    let extra = extra_patterns(config, action, cli_ignore);
    let policy = config.gitignore_policy();

    let files = if changed {
        scanner::get_changed_files_with(root, &extra, policy, devfiles::operations::ShellRunner)
            .await
            .context("获取 Git 变更文件失败")?
    } else {
        scanner::get_all_files_with(root, &extra, policy)
            .await
            .context("枚举文件失败")?
    };

    tracing::debug!("共 {} 个文件", files.len());
    Ok(files)
}

fn print_files(root: &Path, files: &[PathBuf], format: OutputFormat) -> Result<()> {
    let relative: Vec<String> = files.iter().map(|f| relative_key(root, f)).collect();

    match format {
        OutputFormat::Plain => {
            for file in &relative {
                println!("{}", file);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&relative)?);
        }
    }

    Ok(())
}

/// 执行 lint / format
async fn run_action(
    root: &Path,
    config: &Config,
    action: Action,
    mode: RunMode,
    cli_ignore: &[String],
) -> Result<i32> {
    let files = enumerate(root, config, Some(action), mode.changed_only(), cli_ignore).await?;

    let mut dispatcher = Dispatcher::new(root, action, config.languages.clone())
        .show_progress(config.run.show_progress);

    let summary = dispatcher
        .run(mode, &files, |outcome| print_outcome(action, outcome))
        .await;

    if mode != RunMode::Health {
        println!(
            "{} 完成: 成功 {}，失败 {}，跳过 {}",
            action, summary.succeeded, summary.failed, summary.skipped
        );
    }

    Ok(summary.exit_code())
}

fn print_outcome(action: Action, outcome: &FileOutcome) {
    let file = outcome.file().display();

    match outcome {
        FileOutcome::NoConfig { .. } => {
            eprintln!("✗ 未找到文件类别配置: {}", file);
        }
        FileOutcome::NoTool { lang, .. } => {
            eprintln!("✗ [{}] 未配置 {} 工具: {}", lang, action, file);
        }
        FileOutcome::MissingBinary { lang, binary, .. } => {
            eprintln!("✗ [{}] 未找到 {} 工具程序 '{}': {}", lang, action, binary, file);
        }
        FileOutcome::Ready { .. } => {}
        FileOutcome::Ran {
            lang,
            command,
            result,
            ..
        } => {
            let icon = if result.success { "✓" } else { "✗" };
            println!("{} [{}]({}): {}", icon, lang, action, command);

            if !result.success {
                if !result.stdout.is_empty() {
                    eprintln!("{}", result.stdout);
                }
                if !result.stderr.is_empty() {
                    eprintln!("{}", result.stderr);
                }
            }
        }
    }
}

/// 输出每个路径命中的规则，全部未命中时返回 1
fn check_ignore(root: &Path, patterns: &PatternSet, paths: &[PathBuf]) -> i32 {
    let mut any_ignored = false;

    for path in paths {
        let key = ignore_key(root, path);
        match patterns.matching_pattern(&key) {
            Some(pattern) => {
                any_ignored = true;
                println!("{}\t{}", pattern, path.display());
            }
            None => println!("::\t{}", path.display()),
        }
    }

    if any_ignored {
        0
    } else {
        1
    }
}

fn manage_config(
    root: &Path,
    config: &Config,
    explicit: Option<&Path>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Init { force } => {
            let path = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(|| Config::project_config_path(root));

            if path.exists() && !force {
                anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
            }

            Config::default()
                .save_to_file(&path)
                .with_context(|| format!("写入配置失败: {}", path.display()))?;
            println!("已写入默认配置: {}", path.display());
        }
        ConfigAction::Path => match Config::resolve_path(root, explicit) {
            Some(path) => println!("{}", path.display()),
            None => println!("（未找到配置文件，使用内置默认配置）"),
        },
    }

    Ok(())
}
