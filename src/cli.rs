use clap::{Parser, Subcommand};
use std::path::PathBuf;

use devfiles::operations::RunMode;

#[derive(Parser)]
#[command(name = "devfiles")]
#[command(about = "按 .gitignore 规则枚举项目文件，并按文件类型调度检查与格式化工具")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 项目根目录
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 额外的忽略规则（可重复）
    #[arg(short, long = "ignore", global = true)]
    pub ignore: Vec<String>,

    /// 详细输出
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 列出未被忽略的文件
    Files {
        /// 只列出相对 HEAD 变更及未跟踪的文件
        #[arg(long)]
        changed: bool,

        /// 输出格式
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },

    /// 运行检查工具
    Lint {
        /// 运行模式
        #[arg(value_enum, default_value_t = RunMode::Health)]
        mode: RunMode,
    },

    /// 运行格式化工具
    Format {
        /// 运行模式
        #[arg(value_enum, default_value_t = RunMode::Health)]
        mode: RunMode,
    },

    /// 显示每个路径命中的忽略规则
    CheckIgnore {
        /// 相对根目录的路径，也可以是以根目录开头的路径
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// 管理配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 显示当前生效的配置
    Show,

    /// 将默认配置写入项目配置文件
    Init {
        /// 覆盖已存在的配置文件
        #[arg(short, long)]
        force: bool,
    },

    /// 显示当前使用的配置文件路径
    Path,
}

#[derive(clap::ValueEnum, Clone, Copy)]
pub enum OutputFormat {
    /// 每行一个路径
    Plain,
    /// JSON 数组
    Json,
}
